//! 订单域错误类型定义
//!
//! 错误按照传播策略分两类：
//! - 校验/资格类错误在任何写操作之前返回，直接中止请求；
//! - 基础设施错误（数据库）在取消单落库后视为致命，因为此时系统状态
//!   已不可信；外部服务错误（网关、承运商）永远不致命，只降级记录。

use thiserror::Error;

/// 订单域错误类型
#[derive(Debug, Error)]
pub enum OrderError {
    // ==================== 资源不存在 ====================
    #[error("订单不存在: {0}")]
    OrderNotFound(String),

    #[error("取消单不存在: {0}")]
    CancellationNotFound(i64),

    // ==================== 校验错误 ====================
    #[error("参数验证失败: {0}")]
    Validation(String),

    // ==================== 权限错误 ====================
    #[error("无权操作该订单: {order_number}")]
    NotOwner { order_number: String },

    // ==================== 状态冲突 ====================
    #[error("订单尚未送达，不能走申请取消流程: {order_number}")]
    NotYetDelivered { order_number: String },

    #[error("已超出取消窗口: 送达已 {days_since_delivery} 天，窗口为 {window_days} 天")]
    CancellationWindowExpired {
        days_since_delivery: i64,
        window_days: i64,
    },

    #[error("订单已取消: {order_number}")]
    AlreadyCancelled { order_number: String },

    #[error("订单已送达，请使用取消申请流程: {order_number}")]
    UseRequestPath { order_number: String },

    #[error("该订单已有进行中的取消申请: {order_number}")]
    DuplicateCancellation { order_number: String },

    #[error("取消单已处理，当前状态: {current_status}")]
    AlreadyDecided { current_status: String },

    // ==================== 外部服务错误 ====================
    #[error("支付网关错误: {message}")]
    PaymentGateway { message: String },

    #[error("支付网关超时")]
    PaymentGatewayTimeout,

    // ==================== 系统错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, OrderError>;

impl OrderError {
    /// 获取错误码（API 层透传给客户端）
    pub fn code(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::CancellationNotFound(_) => "CANCELLATION_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotOwner { .. } => "FORBIDDEN",
            Self::NotYetDelivered { .. } => "NOT_YET_DELIVERED",
            Self::CancellationWindowExpired { .. } => "CANCELLATION_WINDOW_EXPIRED",
            Self::AlreadyCancelled { .. } => "ALREADY_CANCELLED",
            Self::UseRequestPath { .. } => "USE_REQUEST_PATH",
            Self::DuplicateCancellation { .. } => "DUPLICATE_CANCELLATION",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::PaymentGateway { .. } => "PAYMENT_GATEWAY_ERROR",
            Self::PaymentGatewayTimeout => "PAYMENT_GATEWAY_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误（仅用于外部调用的瞬时故障判定）
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PaymentGatewayTimeout | Self::Database(_))
    }
}

impl From<nefol_shared::error::NefolError> for OrderError {
    fn from(err: nefol_shared::error::NefolError) -> Self {
        use nefol_shared::error::NefolError;
        match err {
            NefolError::Database(e) => Self::Database(e),
            NefolError::Validation(msg) => Self::Validation(msg),
            NefolError::ExternalServiceTimeout { .. } => Self::PaymentGatewayTimeout,
            NefolError::ExternalService { message, .. } => Self::PaymentGateway { message },
            other => Self::Internal(other.to_string()),
        }
    }
}
