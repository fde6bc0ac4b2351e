//! 金币账本实体定义
//!
//! 账本只增不减；用户余额是随账本同步维护的派生值。两者必须在同一个
//! 数据库事务内一起更新，否则会漂移（见 CoinRepository::adjust_balance）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 账本流水类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoinTxType {
    /// 注册奖励
    SignupBonus,
    /// 下单返现
    Cashback,
    /// 推荐佣金
    ReferralCommission,
    /// 下单抵扣（负数）
    Spend,
    /// 取消订单后返还抵扣的金币
    Refund,
    /// 推荐佣金冲正（负数）
    ReferralCommissionReversed,
    /// 返现冲正（负数）
    CashbackReversed,
}

impl CoinTxType {
    /// 冲正类流水 - 取消编排器产出，金额恒为负
    pub fn is_reversal(&self) -> bool {
        matches!(self, Self::ReferralCommissionReversed | Self::CashbackReversed)
    }
}

/// 流水状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoinTxStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

/// 金币账本流水
///
/// amount 带符号：正数入账，负数出账
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CoinTransaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub tx_type: CoinTxType,
    /// 人类可读描述，嵌入订单号与折算金额，供客服排查
    pub description: String,
    pub status: CoinTxStatus,
    /// 关联订单（注册奖励等与订单无关的流水为空）
    #[sqlx(default)]
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
