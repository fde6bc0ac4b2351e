//! 管理员审批
//!
//! 待审核取消单的两条出路：
//! - 批准：取消单置 APPROVED、订单迁入已取消，同事务提交后走结算编排；
//! - 驳回：取消单置 REJECTED、恢复订单可取消标记，履约状态不变。
//!
//! 并发审批靠行级锁 + 状态检查串行化：后到的决策拿到锁时状态已不是
//! PENDING，得到 AlreadyDecided。

use std::sync::Arc;

use chrono::Utc;
use nefol_shared::events::{NotificationEvent, NotificationType};
use sqlx::PgPool;
use tracing::{info, instrument};

use super::dto::{CancellationOutcome, DecisionCommand};
use super::settlement::Settlement;
use crate::error::{OrderError, Result};
use crate::models::{CancellationStatus, OrderCancellation};
use crate::notification::NotificationService;
use crate::repository::{
    AffiliateRepositoryTrait, CancellationRepository, CancellationRepositoryTrait,
    CoinRepositoryTrait, OrderRepository, UserRepositoryTrait,
};

/// 审批服务
pub struct DecisionService<C, A, U, R> {
    pool: PgPool,
    settlement: Arc<Settlement<C, A, U, R>>,
    notifications: Arc<NotificationService>,
}

impl<C, A, U, R> DecisionService<C, A, U, R>
where
    C: CoinRepositoryTrait,
    A: AffiliateRepositoryTrait,
    U: UserRepositoryTrait,
    R: CancellationRepositoryTrait,
{
    pub fn new(
        pool: PgPool,
        settlement: Arc<Settlement<C, A, U, R>>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            settlement,
            notifications,
        }
    }

    /// 批准取消申请
    #[instrument(skip(self, cmd), fields(cancellation_id = cmd.cancellation_id))]
    pub async fn approve(&self, cmd: DecisionCommand) -> Result<CancellationOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // 1. 锁取消单并检查是否仍可决策
        let mut cancellation =
            CancellationRepository::get_for_update_in_tx(&mut tx, cmd.cancellation_id)
                .await?
                .ok_or(OrderError::CancellationNotFound(cmd.cancellation_id))?;

        if !cancellation.is_decidable() {
            return Err(OrderError::AlreadyDecided {
                current_status: cancellation.status.to_string(),
            });
        }

        // 2. 锁订单行；取消单存在但订单缺失属数据异常
        let order =
            OrderRepository::get_by_number_for_update_in_tx(&mut tx, &cancellation.order_number)
                .await?
                .ok_or_else(|| {
                    OrderError::Internal(format!(
                        "取消单 {} 关联的订单 {} 不存在",
                        cancellation.id, cancellation.order_number
                    ))
                })?;

        // 3. 落审批决策并把订单迁入终态
        CancellationRepository::apply_decision_in_tx(
            &mut tx,
            cancellation.id,
            CancellationStatus::Approved,
            cmd.notes.as_deref(),
            &cmd.decided_by,
            now,
        )
        .await?;
        OrderRepository::set_cancelled_in_tx(&mut tx, order.id).await?;

        tx.commit().await?;

        cancellation.status = CancellationStatus::Approved;
        cancellation.admin_notes = cmd.notes;
        cancellation.processed_by = Some(cmd.decided_by);
        cancellation.processed_at = Some(now);

        info!(
            order_number = %order.order_number,
            refund_amount = cancellation.refund_amount,
            "取消申请已批准"
        );

        Ok(self.settlement.settle(&order, &cancellation).await)
    }

    /// 驳回取消申请
    ///
    /// 驳回必须填写备注；订单恢复可取消标记，客户可在窗口内重新申请。
    #[instrument(skip(self, cmd), fields(cancellation_id = cmd.cancellation_id))]
    pub async fn reject(&self, cmd: DecisionCommand) -> Result<OrderCancellation> {
        let notes = cmd
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .ok_or_else(|| OrderError::Validation("驳回取消申请必须填写备注".to_string()))?
            .to_string();

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut cancellation =
            CancellationRepository::get_for_update_in_tx(&mut tx, cmd.cancellation_id)
                .await?
                .ok_or(OrderError::CancellationNotFound(cmd.cancellation_id))?;

        if !cancellation.is_decidable() {
            return Err(OrderError::AlreadyDecided {
                current_status: cancellation.status.to_string(),
            });
        }

        CancellationRepository::apply_decision_in_tx(
            &mut tx,
            cancellation.id,
            CancellationStatus::Rejected,
            Some(&notes),
            &cmd.decided_by,
            now,
        )
        .await?;
        OrderRepository::set_can_cancel_in_tx(&mut tx, cancellation.order_id, true).await?;

        tx.commit().await?;

        cancellation.status = CancellationStatus::Rejected;
        cancellation.admin_notes = Some(notes.clone());
        cancellation.processed_by = Some(cmd.decided_by);
        cancellation.processed_at = Some(now);

        info!(order_number = %cancellation.order_number, "取消申请已驳回");

        if let Some(user_id) = cancellation.user_id {
            let event = NotificationEvent::for_user(
                NotificationType::CancellationRejected,
                user_id,
                "取消申请未通过",
                format!(
                    "您的订单 {} 取消申请未通过审核: {}",
                    cancellation.order_number, notes
                ),
                cancellation.order_number.clone(),
            );
            self.notifications.dispatch(&event).await;
        }

        Ok(cancellation)
    }
}
