//! 客户侧取消 API 处理器

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use nefol_orders::OrderCancellation;
use nefol_orders::dto::CancelCommand;
use tracing::info;
use validator::Validate;

use super::settlement_response;
use crate::dto::{ApiResponse, CancelOrderRequest};
use crate::error::Result;
use crate::state::AppState;

fn to_command(order_number: String, req: CancelOrderRequest) -> CancelCommand {
    CancelCommand {
        order_number,
        contact: req.contact,
        reason: req.reason,
        cancel_type: req.cancel_type,
        items: req.items,
    }
}

/// 提交已送达订单的取消申请
///
/// POST /api/orders/{order_number}/cancel-request
///
/// 送达后窗口期内可申请，创建待审核取消单并锁定订单，结果由管理员决策。
pub async fn request_cancellation(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Json<ApiResponse<OrderCancellation>>> {
    req.validate()?;

    let record = state
        .request_service
        .request_cancellation(to_command(order_number, req))
        .await?;

    info!(cancellation_id = record.id, "取消申请已受理");
    Ok(Json(ApiResponse::success_with_message(
        record,
        "取消申请已提交，审核结果将另行通知",
    )))
}

/// 立即取消未送达订单
///
/// POST /api/orders/{order_number}/cancel
///
/// 取消即时生效；响应带回冲正与退款的结算结果。退款发起失败时返回 500，
/// 响应体仍包含取消单 ID。
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Response> {
    req.validate()?;

    let outcome = state
        .cancel_service
        .cancel_now(to_command(order_number, req))
        .await?;

    Ok(settlement_response(outcome))
}
