//! 共享库
//!
//! 包含订单服务与 API 服务共用的配置、错误处理、数据库连接、缓存、
//! 通知事件模型与重试策略等基础设施代码。

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod retry;
