//! 业务编排层
//!
//! - [`RequestService`]: 已送达订单的取消申请受理
//! - [`CancelService`]: 未送达订单的立即取消
//! - [`DecisionService`]: 管理员审批（批准 / 驳回）
//! - [`ReversalPipeline`]: 金币 / 推荐佣金 / 返现三路冲正
//! - [`RefundDispatcher`]: 支付网关退款派发
//! - [`Settlement`]: 取消落地后的结算编排（两条取消路径共用）

pub mod dto;
pub mod eligibility;

mod cancel_service;
mod decision_service;
mod refund;
mod request_service;
mod reversal;
mod settlement;

pub use cancel_service::CancelService;
pub use decision_service::DecisionService;
pub use refund::RefundDispatcher;
pub use request_service::RequestService;
pub use reversal::ReversalPipeline;
pub use settlement::Settlement;
