//! 分销伙伴实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 分销伙伴
///
/// 聚合计数器在被推荐订单取消时递减，全部下取整到 0——历史上可能存在
/// 手工调账导致计数不足额的情况，宁可计数偏差也不允许出现负数。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AffiliatePartner {
    pub id: i64,
    /// 伙伴对应的平台用户，佣金金币记在该用户的账本上
    pub user_id: i64,
    /// 推广码
    pub code: String,
    pub total_referrals: i64,
    /// 累计收益（卢比）
    pub total_earnings: f64,
    /// 待结算收益（卢比）
    pub pending_earnings: f64,
    pub created_at: DateTime<Utc>,
}
