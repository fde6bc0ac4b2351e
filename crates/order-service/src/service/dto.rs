//! 服务层输入命令与结果对象
//!
//! 编排器对外只暴露这些结构：API 层把 HTTP 请求翻译成命令，把结果
//! 对象序列化进响应。冲正与退款的每一路结果都显式建模，方便排障时
//! 从响应直接看出哪一步降级了。

use serde::{Deserialize, Serialize};

use crate::models::{CancelItem, CancellationType, RefundStatus};

// ---------------------------------------------------------------------------
// 输入命令
// ---------------------------------------------------------------------------

/// 取消命令（申请路径与立即取消路径共用）
#[derive(Debug, Clone)]
pub struct CancelCommand {
    pub order_number: String,
    /// 请求者联系方式（电话或邮箱）；提供时校验订单归属，匿名请求可不填
    pub contact: Option<String>,
    pub reason: String,
    pub cancel_type: CancellationType,
    /// 部分取消的行项目；全单取消为空
    pub items: Option<Vec<CancelItem>>,
}

/// 管理员审批命令
#[derive(Debug, Clone)]
pub struct DecisionCommand {
    pub cancellation_id: i64,
    /// 审批人标识（后台账号名）
    pub decided_by: String,
    /// 审批备注；驳回时必填
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// 冲正结果
// ---------------------------------------------------------------------------

/// 单路冲正的结果
///
/// 冲正是尽力而为的：任何一路失败都不会中断取消流程，失败原因
/// 原样带回给调用方与日志。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversalOutcome {
    /// 已冲正，amount 为回收/退还的金币数
    Reversed { amount: i64 },
    /// 无可冲正项（未用金币 / 无佣金流水 / 流水超窗）
    NothingToReverse,
    /// 用户记录缺失，无法定位余额
    UserNotFound,
    /// 冲正执行失败，需人工核对账本
    Failed { reason: String },
}

impl ReversalOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// 三路冲正的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalSummary {
    /// 下单时抵扣金币的退还
    pub coins: ReversalOutcome,
    /// 推荐佣金回收（8 天窗口内）
    pub referral_commission: ReversalOutcome,
    /// 返现回收（无窗口）
    pub cashback: ReversalOutcome,
}

impl ReversalSummary {
    pub fn has_failure(&self) -> bool {
        self.coins.is_failed()
            || self.referral_commission.is_failed()
            || self.cashback.is_failed()
    }
}

// ---------------------------------------------------------------------------
// 退款结果
// ---------------------------------------------------------------------------

/// 退款发起的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundOutcome {
    pub refund_status: RefundStatus,
    /// 网关分配的退款单号（仅在线支付成功发起时存在）
    pub refund_id: Option<String>,
    /// 失败原因（仅失败时存在）
    pub failure_reason: Option<String>,
}

impl RefundOutcome {
    /// COD / 无网关引用 / 零退款：无需走网关，直接视为已处理
    pub fn processed_offline() -> Self {
        Self {
            refund_status: RefundStatus::Processed,
            refund_id: None,
            failure_reason: None,
        }
    }

    /// 网关已受理，等待到账
    pub fn initiated(refund_id: impl Into<String>) -> Self {
        Self {
            refund_status: RefundStatus::Processing,
            refund_id: Some(refund_id.into()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            refund_status: RefundStatus::Failed,
            refund_id: None,
            failure_reason: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.refund_status == RefundStatus::Failed
    }
}

// ---------------------------------------------------------------------------
// 编排结果
// ---------------------------------------------------------------------------

/// 取消落地后的完整结算结果（立即取消与管理员批准共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    pub cancellation_id: i64,
    pub order_number: String,
    /// 应退金额（卢比）
    pub refund_amount: f64,
    pub reversals: ReversalSummary,
    pub refund: RefundOutcome,
    /// 是否已通知承运商终止配送
    pub carrier_notified: bool,
}
