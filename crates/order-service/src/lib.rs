//! 订单取消与退款对账服务
//!
//! 实现订单取消的完整编排：资格校验、取消单生命周期、金币/推荐佣金/
//! 返现三路冲正、支付网关退款以及通知扇出。
//!
//! ## 核心流程
//!
//! - **申请取消**（已送达订单）：校验送达窗口 -> 创建待审核取消单 ->
//!   锁定订单不可重复申请 -> 通知管理员
//! - **立即取消**（未发货/未送达订单）：校验状态 -> 自动批准取消单 ->
//!   订单置为已取消 -> 冲正管道 -> 退款 -> 承运商取消 -> 通知
//! - **管理员审批**：待审核 -> 批准（触发取消落地 + 冲正 + 退款）或
//!   驳回（恢复订单可取消标记）
//!
//! 取消单和订单状态一旦落库，后续每一步（冲正、退款、通知）都是独立
//! 容错的：单步失败只记录诊断结果，绝不回滚已对客户生效的取消。
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层
//! - `service`: 业务编排层（申请 / 立即取消 / 审批 / 冲正 / 退款）
//! - `payment`: 支付网关客户端
//! - `carrier`: 承运商取消客户端（发出即忘）
//! - `notification`: 通知服务模块

pub mod carrier;
pub mod error;
pub mod models;
pub mod notification;
pub mod payment;
pub mod repository;
pub mod service;

pub use error::{OrderError, Result};
pub use models::*;
pub use notification::{NotificationService, NotificationSink};
pub use payment::{PaymentGateway, RazorpayClient, RefundReceipt, RefundRequest};
pub use repository::{
    AffiliateRepository, CancellationRepository, CoinRepository, OrderRepository, UserRepository,
};
pub use service::{
    CancelService, DecisionService, RefundDispatcher, RequestService, ReversalPipeline,
    Settlement, dto,
};
