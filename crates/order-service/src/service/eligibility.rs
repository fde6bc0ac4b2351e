//! 取消资格校验与退款金额计算
//!
//! 全部是纯函数：不触库、不依赖时钟（时间由调用方注入），两条取消
//! 路径的准入规则都集中在这里，便于穷举测试。
//!
//! 校验顺序固定：终态检查 -> 路径准入 -> 归属校验 -> 重复申请检查 ->
//! 窗口检查。顺序影响并发场景下客户端看到的错误码，不要随意调整。

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{OrderError, Result};
use crate::models::{CancelItem, CancellationType, Order, OrderItem};

/// 送达至今经过的整天数（不足一天按 0 计）
pub fn days_since(delivered_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - delivered_at).num_days()
}

/// 校验已送达订单的申请取消资格
///
/// 已送达订单的取消需要管理员审核，且必须在送达后的窗口期内发起。
/// 联系方式可以不填（匿名请求），填了才做订单归属校验。
pub fn validate_delivered_path(
    order: &Order,
    contact: Option<&str>,
    now: DateTime<Utc>,
    window_days: i64,
) -> Result<()> {
    if order.status.is_terminal() {
        return Err(OrderError::AlreadyCancelled {
            order_number: order.order_number.clone(),
        });
    }

    if !order.status.is_delivered() {
        return Err(OrderError::NotYetDelivered {
            order_number: order.order_number.clone(),
        });
    }

    check_ownership(order, contact)?;

    // 申请受理后立即翻转该标记，重复申请在这里就被拦下
    if !order.can_cancel {
        return Err(OrderError::DuplicateCancellation {
            order_number: order.order_number.clone(),
        });
    }

    // 送达时间缺失的订单不该出现在 Delivered 状态，按数据异常处理
    let delivered_at = order.delivered_at.ok_or_else(|| {
        OrderError::Internal(format!("订单 {} 缺少送达时间", order.order_number))
    })?;

    let elapsed = days_since(delivered_at, now);
    if elapsed > window_days {
        return Err(OrderError::CancellationWindowExpired {
            days_since_delivery: elapsed,
            window_days,
        });
    }

    Ok(())
}

/// 校验未送达订单的立即取消资格
///
/// 未出库/在途订单无需审核直接取消；已送达订单必须走申请流程。
pub fn validate_immediate_path(order: &Order, contact: Option<&str>) -> Result<()> {
    if order.status.is_terminal() {
        return Err(OrderError::AlreadyCancelled {
            order_number: order.order_number.clone(),
        });
    }

    if order.status.is_delivered() {
        return Err(OrderError::UseRequestPath {
            order_number: order.order_number.clone(),
        });
    }

    check_ownership(order, contact)?;

    if !order.can_cancel {
        return Err(OrderError::DuplicateCancellation {
            order_number: order.order_number.clone(),
        });
    }

    Ok(())
}

/// 归属校验只在请求者提供了身份时进行；空白串视同未提供
fn check_ownership(order: &Order, contact: Option<&str>) -> Result<()> {
    if let Some(contact) = contact.map(str::trim).filter(|c| !c.is_empty()) {
        if !order.owned_by_contact(contact) {
            return Err(OrderError::NotOwner {
                order_number: order.order_number.clone(),
            });
        }
    }
    Ok(())
}

/// 计算应退金额（卢比）
///
/// 全单取消退订单总额原值。部分取消按行项目逐项累加：先按 product_id
/// 匹配，找不到再按 slug；请求数量超过原行数量时按原行数量封顶。
/// 匹配不到任何订单行的项目跳过不计入，由返回值带回供调用方记日志。
pub fn compute_refund(
    order: &Order,
    cancel_type: CancellationType,
    items: Option<&[CancelItem]>,
) -> Result<(f64, Vec<CancelItem>)> {
    match cancel_type {
        CancellationType::Full => Ok((order.total, Vec::new())),
        CancellationType::Partial => {
            let requested = items.filter(|items| !items.is_empty()).ok_or_else(|| {
                OrderError::Validation("部分取消必须指定至少一个行项目".to_string())
            })?;

            let mut amount = 0.0;
            let mut unmatched = Vec::new();

            for item in requested {
                match find_line(&order.items, item) {
                    Some(line) => {
                        let quantity = item
                            .quantity
                            .unwrap_or(line.quantity)
                            .clamp(0, line.quantity);
                        amount += line.price * quantity as f64;
                    }
                    None => {
                        warn!(
                            order_number = %order.order_number,
                            product_id = ?item.product_id,
                            slug = ?item.slug,
                            "部分取消项目未匹配到订单行，跳过"
                        );
                        unmatched.push(item.clone());
                    }
                }
            }

            Ok((amount, unmatched))
        }
    }
}

fn find_line<'a>(lines: &'a [OrderItem], item: &CancelItem) -> Option<&'a OrderItem> {
    if let Some(product_id) = item.product_id {
        if let Some(line) = lines.iter().find(|line| line.product_id == product_id) {
            return Some(line);
        }
    }
    if let Some(slug) = item.slug.as_deref() {
        return lines.iter().find(|line| line.slug == slug);
    }
    None
}
