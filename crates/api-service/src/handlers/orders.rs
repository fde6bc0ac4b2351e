//! 订单查询 API 处理器

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use nefol_orders::repository::OrderRepositoryTrait;
use nefol_orders::{Order, OrderError};
use tracing::{debug, warn};

use crate::dto::ApiResponse;
use crate::error::Result;
use crate::state::AppState;

/// 订单详情缓存有效期
const ORDER_CACHE_TTL: Duration = Duration::from_secs(300);

/// 查询订单详情
///
/// GET /api/orders/{order_number}
///
/// 旁路缓存：命中直接返回；未命中读库回填。取消流程落地后会主动失效
/// 该键（键格式与结算编排保持一致），客户端不会读到已取消订单的旧状态。
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<Order>>> {
    let cache_key = format!("order:{}", order_number);

    match state.cache.get::<Order>(&cache_key).await {
        Ok(Some(order)) => {
            debug!(order_number, "订单详情缓存命中");
            return Ok(Json(ApiResponse::success(order)));
        }
        Ok(None) => {}
        Err(e) => {
            // 缓存故障降级为直接读库
            warn!(order_number, error = %e, "订单缓存读取失败");
        }
    }

    let order = state
        .order_repo
        .get_by_number(&order_number)
        .await?
        .ok_or(OrderError::OrderNotFound(order_number.clone()))?;

    if let Err(e) = state.cache.set(&cache_key, &order, ORDER_CACHE_TTL).await {
        warn!(order_number, error = %e, "订单缓存回填失败");
    }

    Ok(Json(ApiResponse::success(order)))
}
