//! 已送达订单的取消申请受理
//!
//! 申请路径不动订单履约状态，只做三件事并在同一事务内提交：
//! 资格校验、创建 PENDING 取消单、关闭订单的可取消标记。
//! 审批与退款留给管理员决策流程。

use std::sync::Arc;

use chrono::Utc;
use nefol_shared::events::{NotificationEvent, NotificationType};
use sqlx::PgPool;
use tracing::{info, instrument};

use super::dto::CancelCommand;
use super::eligibility;
use crate::error::{OrderError, Result};
use crate::models::{CancellationStatus, OrderCancellation};
use crate::notification::NotificationService;
use crate::repository::{CancellationRepository, NewCancellation, OrderRepository};

/// 取消申请服务
pub struct RequestService {
    pool: PgPool,
    notifications: Arc<NotificationService>,
    /// 送达后允许申请取消的窗口（天）
    cancellation_window_days: i64,
}

impl RequestService {
    pub fn new(
        pool: PgPool,
        notifications: Arc<NotificationService>,
        cancellation_window_days: i64,
    ) -> Self {
        Self {
            pool,
            notifications,
            cancellation_window_days,
        }
    }

    /// 受理取消申请
    #[instrument(skip(self, cmd), fields(order_number = %cmd.order_number))]
    pub async fn request_cancellation(&self, cmd: CancelCommand) -> Result<OrderCancellation> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // 1. 锁订单行并做资格校验
        let order = OrderRepository::get_by_number_for_update_in_tx(&mut tx, &cmd.order_number)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(cmd.order_number.clone()))?;

        eligibility::validate_delivered_path(
            &order,
            cmd.contact.as_deref(),
            now,
            self.cancellation_window_days,
        )?;

        // 2. 计算应退金额（审批时原样使用，不再重算）
        let (refund_amount, _unmatched) =
            eligibility::compute_refund(&order, cmd.cancel_type, cmd.items.as_deref())?;

        // 3. 创建待审核取消单并锁定订单
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
                status: CancellationStatus::Pending,
            },
        )
        .await?;

        OrderRepository::set_can_cancel_in_tx(&mut tx, order.id, false).await?;

        tx.commit().await?;

        info!(
            cancellation_id = cancellation.id,
            refund_amount, "取消申请已受理，待管理员审核"
        );

        // 4. 通知（发出即忘）
        let admin_event = NotificationEvent::for_admin(
            NotificationType::CancellationRequested,
            "新的取消申请",
            format!(
                "订单 {} 收到取消申请，应退 ₹{:.2}，原因: {}",
                order.order_number, refund_amount, cmd.reason
            ),
            order.order_number.clone(),
        );
        self.notifications.dispatch(&admin_event).await;

        if let Some(user_id) = order.user_id {
            let user_event = NotificationEvent::for_user(
                NotificationType::CancellationRequested,
                user_id,
                "取消申请已提交",
                format!("您的订单 {} 取消申请已提交，审核结果将另行通知", order.order_number),
                order.order_number.clone(),
            );
            self.notifications.dispatch(&user_event).await;
        }

        Ok(cancellation)
    }
}
