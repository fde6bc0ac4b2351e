//! API 层错误类型定义
//!
//! 把订单域错误翻译成 HTTP 状态码与统一响应体。状态冲突类错误
//! （重复申请、已决策等）统一映射为 400，错误码保留各自的区分度，
//! 客户端按 code 而非状态码做分支。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nefol_orders::OrderError;
use serde_json::json;

/// API 层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("参数验证失败: {0}")]
    Validation(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Order(err) => match err {
                OrderError::OrderNotFound(_) | OrderError::CancellationNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                OrderError::NotOwner { .. } => StatusCode::FORBIDDEN,
                OrderError::Validation(_)
                | OrderError::NotYetDelivered { .. }
                | OrderError::CancellationWindowExpired { .. }
                | OrderError::AlreadyCancelled { .. }
                | OrderError::UseRequestPath { .. }
                | OrderError::DuplicateCancellation { .. }
                | OrderError::AlreadyDecided { .. } => StatusCode::BAD_REQUEST,
                OrderError::PaymentGateway { .. }
                | OrderError::PaymentGatewayTimeout
                | OrderError::Database(_)
                | OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Order(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Order(OrderError::Database(e)) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Order(OrderError::Internal(e)) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Order(err @ (OrderError::PaymentGateway { .. } | OrderError::PaymentGatewayTimeout)) => {
                tracing::error!(error = %err, "支付网关调用失败");
                "退款处理暂时不可用，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// API 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
