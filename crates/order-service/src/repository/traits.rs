//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    AffiliatePartner, CancellationStatus, CoinTransaction, CoinTxType, Order, OrderCancellation,
    RefundStatus, User,
};

/// 订单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>>;
}

/// 取消单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CancellationRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<OrderCancellation>>;
    async fn set_refund_result(
        &self,
        id: i64,
        refund_status: RefundStatus,
        refund_id: Option<String>,
    ) -> Result<()>;
    async fn list(
        &self,
        status: Option<CancellationStatus>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderCancellation>, i64)>;
}

/// 金币账本仓储接口
///
/// `adjust_balance` 在单个事务内完成余额更新 + 账本追加，
/// 调用方不需要也不应该再包事务。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoinRepositoryTrait: Send + Sync {
    async fn adjust_balance(
        &self,
        user_id: i64,
        delta: i64,
        tx_type: CoinTxType,
        description: String,
        order_id: Option<i64>,
    ) -> Result<i64>;

    /// 查找某订单下指定类型的最近一条正数流水
    ///
    /// since 为空时不限制时间窗口（返现冲正无窗口，推荐佣金冲正有 8 天窗口）
    async fn find_latest_positive(
        &self,
        user_id: i64,
        order_id: i64,
        tx_type: CoinTxType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<CoinTransaction>>;
}

/// 分销伙伴仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AffiliateRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<AffiliatePartner>>;

    /// 冲正聚合计数器：推荐数 -1，累计/待结算收益扣减指定金额，全部下取整到 0
    async fn apply_reversal(&self, partner_id: i64, earnings_delta: f64) -> Result<()>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<User>>;

    /// 按联系方式定位用户：电话精确匹配，邮箱大小写不敏感
    async fn find_by_contact(&self, phone: &str, email: Option<String>) -> Result<Option<User>>;
}
