//! 取消审批管理 API 处理器

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use nefol_orders::dto::DecisionCommand;
use nefol_orders::repository::CancellationRepositoryTrait;
use nefol_orders::{OrderCancellation, OrderError};
use tracing::info;
use validator::Validate;

use super::settlement_response;
use crate::dto::{ApiResponse, CancellationListQuery, DecisionRequest, PageResponse};
use crate::error::Result;
use crate::state::AppState;

/// 分页查询取消单
///
/// GET /api/admin/cancellations?status=PENDING&page=1&pageSize=20
pub async fn list_cancellations(
    State(state): State<AppState>,
    Query(query): Query<CancellationListQuery>,
) -> Result<Json<ApiResponse<PageResponse<OrderCancellation>>>> {
    let (page, page_size) = query.normalized();
    let (items, total) = state
        .cancellation_repo
        .list(query.status, page, page_size)
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        items, total, page, page_size,
    ))))
}

/// 查询取消单详情
///
/// GET /api/admin/cancellations/{id}
pub async fn get_cancellation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderCancellation>>> {
    let record = state
        .cancellation_repo
        .get(id)
        .await?
        .ok_or(OrderError::CancellationNotFound(id))?;

    Ok(Json(ApiResponse::success(record)))
}

/// 批准取消申请
///
/// POST /api/admin/cancellations/{id}/approve
///
/// 订单迁入已取消并触发冲正与退款；响应带回完整结算结果。
pub async fn approve_cancellation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> Result<Response> {
    req.validate()?;

    let outcome = state
        .decision_service
        .approve(DecisionCommand {
            cancellation_id: id,
            decided_by: req.decided_by,
            notes: req.notes,
        })
        .await?;

    info!(cancellation_id = id, "取消申请已批准");
    Ok(settlement_response(outcome))
}

/// 驳回取消申请
///
/// POST /api/admin/cancellations/{id}/reject
///
/// 备注必填；订单恢复可取消标记，客户可在窗口内重新申请。
pub async fn reject_cancellation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<OrderCancellation>>> {
    req.validate()?;

    let record = state
        .decision_service
        .reject(DecisionCommand {
            cancellation_id: id,
            decided_by: req.decided_by,
            notes: req.notes,
        })
        .await?;

    info!(cancellation_id = id, "取消申请已驳回");
    Ok(Json(ApiResponse::success_with_message(
        record,
        "取消申请已驳回",
    )))
}
