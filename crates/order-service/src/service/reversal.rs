//! 冲正管道
//!
//! 订单取消落地后依次执行三路冲正：退还下单抵扣的金币、回收推荐佣金、
//! 回收返现。三路相互隔离：每一路自行捕获错误并降级为 [`ReversalOutcome`]，
//! 任何一路失败都不会阻断其余两路，也不会回滚已生效的取消。
//!
//! 窗口规则：推荐佣金只回收送达前 `referral_window_days` 天内发放的
//! 流水，返现回收不设窗口。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use super::dto::{ReversalOutcome, ReversalSummary};
use crate::models::{CoinTxType, Order, User};
use crate::repository::{AffiliateRepositoryTrait, CoinRepositoryTrait, UserRepositoryTrait};

/// 冲正管道
pub struct ReversalPipeline<C, A, U> {
    coin_repo: Arc<C>,
    affiliate_repo: Arc<A>,
    user_repo: Arc<U>,
    /// 金币与卢比的兑换比率
    coins_per_rupee: i64,
    /// 推荐佣金可回收窗口（天）
    referral_window_days: i64,
}

impl<C, A, U> ReversalPipeline<C, A, U>
where
    C: CoinRepositoryTrait,
    A: AffiliateRepositoryTrait,
    U: UserRepositoryTrait,
{
    pub fn new(
        coin_repo: Arc<C>,
        affiliate_repo: Arc<A>,
        user_repo: Arc<U>,
        coins_per_rupee: i64,
        referral_window_days: i64,
    ) -> Self {
        Self {
            coin_repo,
            affiliate_repo,
            user_repo,
            coins_per_rupee,
            referral_window_days,
        }
    }

    /// 执行三路冲正
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    pub async fn run(&self, order: &Order, now: DateTime<Utc>) -> ReversalSummary {
        let summary = ReversalSummary {
            coins: self.reverse_coins(order).await,
            referral_commission: self.reverse_referral_commission(order, now).await,
            cashback: self.reverse_cashback(order).await,
        };

        if summary.has_failure() {
            warn!(summary = ?summary, "冲正存在失败项，需人工核对账本");
        } else {
            info!(summary = ?summary, "冲正完成");
        }
        summary
    }

    /// 第一路：退还下单时抵扣的金币
    async fn reverse_coins(&self, order: &Order) -> ReversalOutcome {
        if order.coins_used <= 0 {
            return ReversalOutcome::NothingToReverse;
        }

        // 抵扣过金币的订单必然有账户，定位不到按用户缺失记录
        let user_id = match self.resolve_customer(order).await {
            Ok(Some(user)) => user.id,
            Ok(None) => return ReversalOutcome::UserNotFound,
            Err(outcome) => return outcome,
        };

        let rupee_value = order.coins_used as f64 / self.coins_per_rupee as f64;
        let description = format!(
            "订单 {} 取消，退还下单抵扣金币（折合 ₹{:.2}）",
            order.order_number, rupee_value
        );

        match self
            .coin_repo
            .adjust_balance(
                user_id,
                order.coins_used,
                CoinTxType::Refund,
                description,
                Some(order.id),
            )
            .await
        {
            Ok(new_balance) => {
                info!(user_id, amount = order.coins_used, new_balance, "已退还抵扣金币");
                ReversalOutcome::Reversed {
                    amount: order.coins_used,
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "金币退还失败");
                ReversalOutcome::failed(e.to_string())
            }
        }
    }

    /// 第二路：回收推荐佣金（窗口内）
    async fn reverse_referral_commission(
        &self,
        order: &Order,
        now: DateTime<Utc>,
    ) -> ReversalOutcome {
        let Some(affiliate_id) = order.affiliate_id else {
            return ReversalOutcome::NothingToReverse;
        };

        let partner = match self.affiliate_repo.get(affiliate_id).await {
            Ok(Some(partner)) => partner,
            Ok(None) => {
                warn!(affiliate_id, "推荐人记录不存在，跳过佣金回收");
                return ReversalOutcome::NothingToReverse;
            }
            Err(e) => {
                warn!(affiliate_id, error = %e, "推荐人查询失败");
                return ReversalOutcome::failed(e.to_string());
            }
        };

        let since = now - Duration::days(self.referral_window_days);
        let commission = match self
            .coin_repo
            .find_latest_positive(
                partner.user_id,
                order.id,
                CoinTxType::ReferralCommission,
                Some(since),
            )
            .await
        {
            Ok(Some(tx)) => tx,
            Ok(None) => {
                // 未发放过佣金，或流水已超出回收窗口
                return ReversalOutcome::NothingToReverse;
            }
            Err(e) => {
                warn!(affiliate_id, error = %e, "佣金流水查询失败");
                return ReversalOutcome::failed(e.to_string());
            }
        };

        let description = format!("订单 {} 取消，回收推荐佣金", order.order_number);
        if let Err(e) = self
            .coin_repo
            .adjust_balance(
                partner.user_id,
                -commission.amount,
                CoinTxType::ReferralCommissionReversed,
                description,
                Some(order.id),
            )
            .await
        {
            warn!(partner_user_id = partner.user_id, error = %e, "佣金回收入账失败");
            return ReversalOutcome::failed(e.to_string());
        }

        // 同步冲正推荐人聚合计数；余额已回收，这一步失败只降级记录
        let earnings_delta = commission.amount as f64 / self.coins_per_rupee as f64;
        if let Err(e) = self
            .affiliate_repo
            .apply_reversal(partner.id, earnings_delta)
            .await
        {
            warn!(partner_id = partner.id, error = %e, "推荐人计数冲正失败");
            return ReversalOutcome::failed(e.to_string());
        }

        info!(
            partner_id = partner.id,
            amount = commission.amount,
            "已回收推荐佣金"
        );
        ReversalOutcome::Reversed {
            amount: commission.amount,
        }
    }

    /// 第三路：回收返现（无窗口限制）
    async fn reverse_cashback(&self, order: &Order) -> ReversalOutcome {
        let user_id = match self.resolve_customer(order).await {
            Ok(Some(user)) => user.id,
            Ok(None) if order.user_id.is_some() => return ReversalOutcome::UserNotFound,
            // 没有账户的游客单不会有返现流水
            Ok(None) => return ReversalOutcome::NothingToReverse,
            Err(outcome) => return outcome,
        };

        let cashback = match self
            .coin_repo
            .find_latest_positive(user_id, order.id, CoinTxType::Cashback, None)
            .await
        {
            Ok(Some(tx)) => tx,
            Ok(None) => return ReversalOutcome::NothingToReverse,
            Err(e) => {
                warn!(user_id, error = %e, "返现流水查询失败");
                return ReversalOutcome::failed(e.to_string());
            }
        };

        let description = format!("订单 {} 取消，回收返现", order.order_number);
        match self
            .coin_repo
            .adjust_balance(
                user_id,
                -cashback.amount,
                CoinTxType::CashbackReversed,
                description,
                Some(order.id),
            )
            .await
        {
            Ok(_) => {
                info!(user_id, amount = cashback.amount, "已回收返现");
                ReversalOutcome::Reversed {
                    amount: cashback.amount,
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "返现回收入账失败");
                ReversalOutcome::failed(e.to_string())
            }
        }
    }

    /// 定位下单客户：优先订单上的 user_id，游客单回退按联系方式匹配
    async fn resolve_customer(&self, order: &Order) -> Result<Option<User>, ReversalOutcome> {
        if let Some(user_id) = order.user_id {
            return match self.user_repo.get(user_id).await {
                Ok(user) => Ok(user),
                Err(e) => {
                    warn!(user_id, error = %e, "用户查询失败");
                    Err(ReversalOutcome::failed(e.to_string()))
                }
            };
        }

        match self
            .user_repo
            .find_by_contact(&order.customer_phone, order.customer_email.clone())
            .await
        {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(phone = %order.customer_phone, error = %e, "按联系方式查找用户失败");
                Err(ReversalOutcome::failed(e.to_string()))
            }
        }
    }
}
