//! 退款派发
//!
//! 取消单进入 APPROVED 后由这里决定退款路径：
//! - COD 订单、无网关引用或零退款金额：无需走网关，直接标记已处理，
//!   实际结算由线下完成；
//! - 在线支付订单：按最小货币单位（卢比 × 100 取整）向网关发起退款，
//!   受理成功记 PROCESSING 与网关退款单号，失败记 FAILED 待人工介入。
//!
//! 退款结果永远不回滚已生效的取消；退款状态落库失败也只降级记录。

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::dto::RefundOutcome;
use crate::models::{Order, OrderCancellation, RefundStatus};
use crate::payment::{PaymentGateway, RefundRequest};
use crate::repository::CancellationRepositoryTrait;

/// 退款派发器
pub struct RefundDispatcher<R> {
    cancellation_repo: Arc<R>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<R> RefundDispatcher<R>
where
    R: CancellationRepositoryTrait,
{
    pub fn new(cancellation_repo: Arc<R>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            cancellation_repo,
            gateway,
        }
    }

    /// 为已批准的取消单发起退款
    #[instrument(skip(self, order, cancellation), fields(
        order_number = %order.order_number,
        cancellation_id = cancellation.id,
        refund_amount = cancellation.refund_amount,
    ))]
    pub async fn dispatch(
        &self,
        order: &Order,
        cancellation: &OrderCancellation,
    ) -> RefundOutcome {
        // 无金额可退：部分取消全部未匹配时会出现
        if cancellation.refund_amount <= 0.0 {
            info!("退款金额为零，直接标记已处理");
            return self
                .record(cancellation.id, RefundOutcome::processed_offline())
                .await;
        }

        // COD 或缺少网关引用的订单走线下结算
        let Some(payment_reference) = order
            .payment_reference
            .as_deref()
            .filter(|_| !order.payment_method.is_cod())
        else {
            info!("无网关退款路径（COD 或缺少支付引用），标记已处理");
            return self
                .record(cancellation.id, RefundOutcome::processed_offline())
                .await;
        };

        // 网关按最小货币单位（paise）计额
        let amount_minor = (cancellation.refund_amount * 100.0).round() as i64;
        let request = RefundRequest {
            payment_reference: payment_reference.to_string(),
            amount_minor,
            cancellation_id: cancellation.id,
            order_number: order.order_number.clone(),
            reason: cancellation.reason.clone(),
        };

        match self.gateway.refund(&request).await {
            Ok(receipt) => {
                info!(refund_id = %receipt.refund_id, "退款已发起");
                self.record(cancellation.id, RefundOutcome::initiated(receipt.refund_id))
                    .await
            }
            Err(e) => {
                warn!(error = %e, "退款发起失败，待人工介入");
                self.record(cancellation.id, RefundOutcome::failed(e.to_string()))
                    .await
            }
        }
    }

    /// 把退款结果落到取消单上
    ///
    /// 落库失败不改变返回的结果对象，只留 warn 日志供对账
    async fn record(&self, cancellation_id: i64, outcome: RefundOutcome) -> RefundOutcome {
        if let Err(e) = self
            .cancellation_repo
            .set_refund_result(
                cancellation_id,
                outcome.refund_status,
                outcome.refund_id.clone(),
            )
            .await
        {
            warn!(cancellation_id, error = %e, "退款状态落库失败");
        }
        outcome
    }
}
