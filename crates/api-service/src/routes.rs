//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 客户侧路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/{order_number}", get(handlers::orders::get_order))
        .route(
            "/orders/{order_number}/cancel",
            post(handlers::cancellations::cancel_order),
        )
        .route(
            "/orders/{order_number}/cancel-request",
            post(handlers::cancellations::request_cancellation),
        )
}

/// 管理后台路由
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cancellations",
            get(handlers::admin::list_cancellations),
        )
        .route(
            "/cancellations/{id}",
            get(handlers::admin::get_cancellation),
        )
        .route(
            "/cancellations/{id}/approve",
            post(handlers::admin::approve_cancellation),
        )
        .route(
            "/cancellations/{id}/reject",
            post(handlers::admin::reject_cancellation),
        )
}
