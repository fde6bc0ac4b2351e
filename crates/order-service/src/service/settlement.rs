//! 取消落地后的结算编排
//!
//! 立即取消与管理员批准共用同一段后置流程：冲正管道 -> 退款派发 ->
//! 承运商通知 -> 缓存失效 -> 通知扇出。进入这里时取消单与订单状态
//! 已经提交，每一步都只降级、不回滚。

use std::sync::Arc;

use chrono::Utc;
use nefol_shared::cache::Cache;
use nefol_shared::events::{NotificationEvent, NotificationType};
use tracing::{instrument, warn};

use super::dto::{CancellationOutcome, RefundOutcome};
use super::refund::RefundDispatcher;
use super::reversal::ReversalPipeline;
use crate::carrier::CarrierService;
use crate::models::{Order, OrderCancellation};
use crate::notification::NotificationService;
use crate::repository::{
    AffiliateRepositoryTrait, CancellationRepositoryTrait, CoinRepositoryTrait,
    UserRepositoryTrait,
};

/// 订单详情缓存键
pub(crate) fn order_cache_key(order_number: &str) -> String {
    format!("order:{}", order_number)
}

/// 结算编排器
pub struct Settlement<C, A, U, R> {
    reversals: ReversalPipeline<C, A, U>,
    refunds: RefundDispatcher<R>,
    carrier: CarrierService,
    notifications: Arc<NotificationService>,
    cache: Option<Arc<Cache>>,
}

impl<C, A, U, R> Settlement<C, A, U, R>
where
    C: CoinRepositoryTrait,
    A: AffiliateRepositoryTrait,
    U: UserRepositoryTrait,
    R: CancellationRepositoryTrait,
{
    pub fn new(
        reversals: ReversalPipeline<C, A, U>,
        refunds: RefundDispatcher<R>,
        carrier: CarrierService,
        notifications: Arc<NotificationService>,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        Self {
            reversals,
            refunds,
            carrier,
            notifications,
            cache,
        }
    }

    /// 执行取消后结算
    ///
    /// `order` 为取消提交前的订单快照（承运商通知依赖原履约状态）
    #[instrument(skip(self, order, cancellation), fields(
        order_number = %order.order_number,
        cancellation_id = cancellation.id,
    ))]
    pub async fn settle(
        &self,
        order: &Order,
        cancellation: &OrderCancellation,
    ) -> CancellationOutcome {
        let reversals = self.reversals.run(order, Utc::now()).await;
        let refund = self.refunds.dispatch(order, cancellation).await;
        let carrier_notified = self.carrier.request_cancellation(order).await;

        self.invalidate_cache(&order.order_number).await;
        self.notify(order, &refund).await;

        CancellationOutcome {
            cancellation_id: cancellation.id,
            order_number: order.order_number.clone(),
            refund_amount: cancellation.refund_amount,
            reversals,
            refund,
            carrier_notified,
        }
    }

    async fn invalidate_cache(&self, order_number: &str) {
        let Some(cache) = &self.cache else { return };
        if let Err(e) = cache.delete(&order_cache_key(order_number)).await {
            warn!(order_number, error = %e, "订单缓存失效失败");
        }
    }

    async fn notify(&self, order: &Order, refund: &RefundOutcome) {
        if let Some(user_id) = order.user_id {
            let event = NotificationEvent::for_user(
                NotificationType::OrderCancelled,
                user_id,
                "订单已取消",
                format!("您的订单 {} 已取消", order.order_number),
                order.order_number.clone(),
            );
            self.notifications.dispatch(&event).await;

            if let Some(refund_id) = &refund.refund_id {
                let event = NotificationEvent::for_user(
                    NotificationType::RefundInitiated,
                    user_id,
                    "退款已发起",
                    format!(
                        "订单 {} 的退款已提交支付网关（退款单号 {}），预计 5-7 个工作日到账",
                        order.order_number, refund_id
                    ),
                    order.order_number.clone(),
                );
                self.notifications.dispatch(&event).await;
            }
        }

        if refund.is_failed() {
            let event = NotificationEvent::for_admin(
                NotificationType::RefundFailed,
                "退款发起失败",
                format!(
                    "订单 {} 的退款发起失败: {}",
                    order.order_number,
                    refund.failure_reason.as_deref().unwrap_or("未知原因")
                ),
                order.order_number.clone(),
            );
            self.notifications.dispatch(&event).await;
        }
    }
}
