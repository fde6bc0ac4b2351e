//! 订单取消 REST API 服务
//!
//! 对外暴露两类端点：
//!
//! - **客户侧** `/api`：订单查询、立即取消、取消申请
//! - **管理后台** `/api/admin`：取消单列表 / 详情 / 批准 / 驳回
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型与 HTTP 映射
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态与服务装配
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use dto::{ApiResponse, CancelOrderRequest, CancellationListQuery, DecisionRequest, PageResponse};
pub use error::{ApiError, Result};
pub use state::AppState;
