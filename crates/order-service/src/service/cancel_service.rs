//! 未送达订单的立即取消
//!
//! 事务内完成：锁订单 -> 资格校验 -> 创建自动批准的取消单 -> 订单置为
//! 已取消。提交后交给结算编排器做冲正、退款、承运商通知与通知扇出。

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument};

use super::dto::{CancelCommand, CancellationOutcome};
use super::eligibility;
use super::settlement::Settlement;
use crate::error::{OrderError, Result};
use crate::models::CancellationStatus;
use crate::repository::{
    AffiliateRepositoryTrait, CancellationRepository, CancellationRepositoryTrait,
    CoinRepositoryTrait, NewCancellation, OrderRepository, UserRepositoryTrait,
};

/// 立即取消服务
pub struct CancelService<C, A, U, R> {
    pool: PgPool,
    settlement: Arc<Settlement<C, A, U, R>>,
}

impl<C, A, U, R> CancelService<C, A, U, R>
where
    C: CoinRepositoryTrait,
    A: AffiliateRepositoryTrait,
    U: UserRepositoryTrait,
    R: CancellationRepositoryTrait,
{
    pub fn new(pool: PgPool, settlement: Arc<Settlement<C, A, U, R>>) -> Self {
        Self { pool, settlement }
    }

    /// 立即取消未送达订单
    ///
    /// 返回 Ok 即表示取消已生效；结算各步的降级情况见返回的结果对象。
    #[instrument(skip(self, cmd), fields(order_number = %cmd.order_number))]
    pub async fn cancel_now(&self, cmd: CancelCommand) -> Result<CancellationOutcome> {
        let mut tx = self.pool.begin().await?;

        // 1. 锁订单行并做资格校验
        let order = OrderRepository::get_by_number_for_update_in_tx(&mut tx, &cmd.order_number)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(cmd.order_number.clone()))?;

        eligibility::validate_immediate_path(&order, cmd.contact.as_deref())?;

        let (refund_amount, _unmatched) =
            eligibility::compute_refund(&order, cmd.cancel_type, cmd.items.as_deref())?;

        // 2. 自动批准的取消单 + 订单迁入终态，同事务提交
        let cancellation = CancellationRepository::create_in_tx(
            &mut tx,
            &NewCancellation {
                order_id: order.id,
                order_number: order.order_number.clone(),
                user_id: order.user_id,
                reason: cmd.reason.clone(),
                cancel_type: cmd.cancel_type,
                items: cmd.items.clone(),
                refund_amount,
                status: CancellationStatus::Approved,
            },
        )
        .await?;

        OrderRepository::set_cancelled_in_tx(&mut tx, order.id).await?;

        tx.commit().await?;

        info!(cancellation_id = cancellation.id, refund_amount, "订单已立即取消");

        // 3. 取消已对客户生效，结算各步只降级不回滚
        Ok(self.settlement.settle(&order, &cancellation).await)
    }
}
