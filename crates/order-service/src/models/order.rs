//! 订单实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 订单履约状态
///
/// CANCELLED 为终态：一旦进入不允许任何后续状态迁移
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 已创建 - 支付完成，待处理
    #[default]
    Created,
    /// 处理中 - 仓库拣货打包
    Processing,
    /// 已发货 - 交接承运商
    Shipped,
    /// 已送达 - 承运商确认签收
    Delivered,
    /// 已完成 - 超过售后窗口自动归档
    Completed,
    /// 已取消 - 终态
    Cancelled,
}

impl OrderStatus {
    /// 是否处于送达后的状态（申请取消流程的准入条件）
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered | Self::Completed)
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// 在线支付（Razorpay）
    #[default]
    Razorpay,
    /// 货到付款 - 退款走线下人工结算
    Cod,
}

impl PaymentMethod {
    /// 货到付款没有网关退款，取消时直接标记为已处理
    pub fn is_cod(&self) -> bool {
        matches!(self, Self::Cod)
    }
}

/// 订单行项目
///
/// 以 JSONB 形式整体存储在订单上；部分取消按 product_id 或 slug 匹配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    /// 商品 slug，部分取消时的备用匹配键
    pub slug: String,
    pub name: String,
    /// 单价（卢比）
    pub price: f64,
    pub quantity: i64,
}

/// 订单
///
/// 由下单/履约子系统负责创建和推进；取消编排器只把它迁移到 Cancelled
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// 业务订单号（如 NEFOL-1001），对外唯一标识
    pub order_number: String,
    /// 下单用户 ID（游客下单为空）
    #[sqlx(default)]
    pub user_id: Option<i64>,
    pub customer_name: String,
    /// 联系方式 - 取消申请的归属校验按它匹配
    pub customer_phone: String,
    #[sqlx(default)]
    pub customer_email: Option<String>,
    pub status: OrderStatus,
    /// 行项目快照
    pub items: Json<Vec<OrderItem>>,
    /// 订单总额（卢比）
    pub total: f64,
    /// 下单时抵扣的金币数
    pub coins_used: i64,
    /// 推荐人（分销伙伴）ID
    #[sqlx(default)]
    pub affiliate_id: Option<i64>,
    pub payment_method: PaymentMethod,
    /// 支付网关交易引用（COD 订单为空）
    #[sqlx(default)]
    pub payment_reference: Option<String>,
    /// 是否允许发起取消（申请受理后立即置 false，阻断重复申请）
    pub can_cancel: bool,
    #[sqlx(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// 校验请求者联系方式是否与订单归属匹配
    ///
    /// 电话或邮箱任一匹配即认为是订单所有者；大小写不敏感
    pub fn owned_by_contact(&self, contact: &str) -> bool {
        let contact = contact.trim();
        if contact.is_empty() {
            return false;
        }
        if self.customer_phone == contact {
            return true;
        }
        self.customer_email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(contact))
    }
}
