//! 支付网关抽象
//!
//! 退款编排只依赖 `PaymentGateway` trait；生产环境注入 Razorpay 客户端，
//! 测试注入 mock。网关错误永远不会让已落库的取消结果回滚。

mod razorpay;

pub use razorpay::RazorpayClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 退款请求
///
/// `amount_minor` 为最小货币单位（卢比 × 100 取整后的 paise）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    /// 原支付交易的网关引用
    pub payment_reference: String,
    pub amount_minor: i64,
    /// 关联取消单 ID，写入网关侧备注便于对账
    pub cancellation_id: i64,
    pub order_number: String,
    pub reason: String,
}

/// 网关受理退款后的回执
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundReceipt {
    /// 网关分配的退款单号
    pub refund_id: String,
    /// 网关侧状态原文（如 "pending" / "processed"）
    pub gateway_status: String,
}

/// 支付网关接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// 对原支付交易发起退款
    ///
    /// 只有网关明确受理才返回 Ok；超时与网关侧拒绝都以错误返回，
    /// 由退款编排决定落什么退款状态。
    async fn refund(&self, request: &RefundRequest) -> Result<RefundReceipt>;
}
