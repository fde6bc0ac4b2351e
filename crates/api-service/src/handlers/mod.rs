//! HTTP 请求处理器

pub mod admin;
pub mod cancellations;
pub mod orders;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nefol_orders::dto::CancellationOutcome;

use crate::dto::ApiResponse;

/// 把结算结果翻译成 HTTP 响应
///
/// 取消本身已经生效，但退款发起失败时按约定返回 500，响应体仍带回
/// 完整的结算结果（含取消单 ID），客户端据此引导用户联系客服。
pub(crate) fn settlement_response(outcome: CancellationOutcome) -> Response {
    if outcome.refund.is_failed() {
        let message = format!(
            "订单已取消，但退款发起失败（取消单 {}），请联系客服处理退款",
            outcome.cancellation_id
        );
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure_with_data("REFUND_FAILED", message, outcome)),
        )
            .into_response();
    }

    Json(ApiResponse::success(outcome)).into_response()
}
