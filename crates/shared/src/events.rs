//! 通知事件模型
//!
//! 定义取消/退款流程向外发布的通知事件的统一格式。通知以"发出即忘"
//! 的方式投递：编排器只负责构造事件并交给发送器，投递失败绝不影响
//! 已经完成的取消结果。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// NotificationType — 通知类型
// ---------------------------------------------------------------------------

/// 通知类型
///
/// 不同通知类型对应不同的消息模板和受众默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// 客户提交了已送达订单的取消申请（管理员需要人工审核）
    CancellationRequested,
    /// 订单已取消（立即取消或管理员批准后）
    OrderCancelled,
    /// 取消申请被驳回
    CancellationRejected,
    /// 退款已发起，等待网关处理
    RefundInitiated,
    /// 退款发起失败，需要人工介入
    RefundFailed,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 与 serde 的 SCREAMING_SNAKE_CASE 保持一致，便于日志与持久化记录统一引用
        let s = match self {
            Self::CancellationRequested => "CANCELLATION_REQUESTED",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::CancellationRejected => "CANCELLATION_REJECTED",
            Self::RefundInitiated => "REFUND_INITIATED",
            Self::RefundFailed => "REFUND_FAILED",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// NotificationChannel — 投递渠道
// ---------------------------------------------------------------------------

/// 通知投递渠道
///
/// 各渠道有不同的消息长度限制和格式要求，发送器按渠道适配内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    /// 站内实时通知（管理后台 / 客户端应用内）
    InApp,
    Email,
    Whatsapp,
}

// ---------------------------------------------------------------------------
// NotificationAudience — 受众
// ---------------------------------------------------------------------------

/// 通知受众
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationAudience {
    Admin,
    User,
}

// ---------------------------------------------------------------------------
// NotificationEvent — 通知事件
// ---------------------------------------------------------------------------

/// 通知事件
///
/// 取消流程产出的所有通知都包装成该结构：先持久化一条记录（管理后台
/// 的通知列表读它），再分发到各渠道发送器。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// 通知唯一标识（UUID v7，时间有序便于索引）
    pub notification_id: String,
    pub notification_type: NotificationType,
    pub audience: NotificationAudience,
    /// 受众为 User 且请求者身份已知时填充
    pub user_id: Option<i64>,
    pub title: String,
    pub body: String,
    /// 关联订单号，便于通知列表跳转
    pub order_number: String,
    pub channels: Vec<NotificationChannel>,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// 构造管理员通知
    ///
    /// 默认只走站内渠道：管理员常驻后台，邮件/WhatsApp 留给客户侧
    pub fn for_admin(
        notification_type: NotificationType,
        title: impl Into<String>,
        body: impl Into<String>,
        order_number: impl Into<String>,
    ) -> Self {
        Self {
            notification_id: Uuid::now_v7().to_string(),
            notification_type,
            audience: NotificationAudience::Admin,
            user_id: None,
            title: title.into(),
            body: body.into(),
            order_number: order_number.into(),
            channels: vec![NotificationChannel::InApp],
            created_at: Utc::now(),
        }
    }

    /// 构造用户通知（全渠道）
    pub fn for_user(
        notification_type: NotificationType,
        user_id: i64,
        title: impl Into<String>,
        body: impl Into<String>,
        order_number: impl Into<String>,
    ) -> Self {
        Self {
            notification_id: Uuid::now_v7().to_string(),
            notification_type,
            audience: NotificationAudience::User,
            user_id: Some(user_id),
            title: title.into(),
            body: body.into(),
            order_number: order_number.into(),
            channels: vec![
                NotificationChannel::InApp,
                NotificationChannel::Email,
                NotificationChannel::Whatsapp,
            ],
            created_at: Utc::now(),
        }
    }
}
