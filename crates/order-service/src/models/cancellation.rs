//! 取消单实体定义
//!
//! 取消单由取消编排器独占管理。不变式：同一订单在任意时刻至多存在
//! 一条 PENDING 或 APPROVED 状态的取消单，由数据库部分唯一索引保证
//! （见 migrations/0001_init.sql 的 uq_order_cancellations_active）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 取消类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationType {
    /// 全单取消 - 退款金额为订单总额原值
    #[default]
    Full,
    /// 部分取消 - 退款金额按可匹配的行项目逐项累加
    Partial,
}

/// 取消单状态
///
/// 状态机：PENDING -> APPROVED | REJECTED，仅允许从 PENDING 迁出
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationStatus {
    /// 待审核 - 已送达订单的取消申请需要管理员人工决策
    #[default]
    Pending,
    /// 已批准 - 订单已置为取消，退款流程已触发
    Approved,
    /// 已驳回 - 订单恢复可取消标记，履约状态不变
    Rejected,
}

impl std::fmt::Display for CancellationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// 退款状态
///
/// 仅对 APPROVED 的取消单有意义
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    /// 未触发
    #[default]
    None,
    /// 网关已受理，等待到账
    Processing,
    /// 已完成（COD / 无网关引用的订单直接进入该状态，线下结算）
    Processed,
    /// 网关调用失败，需要人工介入
    Failed,
}

/// 申请取消的行项目
///
/// product_id 与 slug 二选一即可；quantity 缺省时按原订单行数量取消
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelItem {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// 取消单
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancellation {
    pub id: i64,
    pub order_id: i64,
    /// 冗余订单号，管理后台列表免联表
    pub order_number: String,
    /// 请求者用户 ID（未登录请求者为空）
    #[sqlx(default)]
    pub user_id: Option<i64>,
    pub reason: String,
    pub cancel_type: CancellationType,
    /// 部分取消的行项目（全单取消为空）
    #[sqlx(default)]
    pub items: Option<Json<Vec<CancelItem>>>,
    /// 应退金额（卢比）
    pub refund_amount: f64,
    pub status: CancellationStatus,
    pub refund_status: RefundStatus,
    /// 网关分配的退款单号
    #[sqlx(default)]
    pub refund_id: Option<String>,
    #[sqlx(default)]
    pub admin_notes: Option<String>,
    /// 审批人标识
    #[sqlx(default)]
    pub processed_by: Option<String>,
    #[sqlx(default)]
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderCancellation {
    /// 是否仍可被管理员决策
    pub fn is_decidable(&self) -> bool {
        self.status == CancellationStatus::Pending
    }
}
