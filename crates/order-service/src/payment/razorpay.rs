//! Razorpay 退款客户端
//!
//! 调用 `POST /payments/{payment_id}/refund` 对原交易发起退款。
//! 网关偶发超时走有界重试；4xx 业务拒绝（如支付引用无效）不重试。

use std::time::Duration;

use nefol_shared::retry::{retry_with_policy, RetryPolicy};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{PaymentGateway, RefundReceipt, RefundRequest};
use crate::error::{OrderError, Result};

/// Razorpay 退款客户端
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    retry_policy: RetryPolicy,
}

/// 网关退款接口响应体（只取需要的字段）
#[derive(Debug, Deserialize)]
struct RazorpayRefundResponse {
    id: String,
    status: String,
}

/// 网关错误响应体
#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    code: String,
    description: String,
}

impl RazorpayClient {
    /// 创建客户端
    ///
    /// 超时在 HTTP 客户端层面强制，避免网关无响应拖死取消请求
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| OrderError::Internal(format!("构建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            retry_policy: RetryPolicy::external_call(),
        })
    }

    async fn refund_once(&self, request: &RefundRequest) -> Result<RefundReceipt> {
        let url = format!(
            "{}/payments/{}/refund",
            self.base_url, request.payment_reference
        );

        // notes 写入网关侧，退款对账时可追溯到取消单
        let body = json!({
            "amount": request.amount_minor,
            "speed": "normal",
            "notes": {
                "cancellation_id": request.cancellation_id.to_string(),
                "order_number": request.order_number,
                "reason": request.reason,
            },
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OrderError::PaymentGatewayTimeout
                } else {
                    OrderError::PaymentGateway {
                        message: format!("请求发送失败: {}", e),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let parsed: RazorpayRefundResponse = response.json().await.map_err(|e| {
                OrderError::PaymentGateway {
                    message: format!("响应解析失败: {}", e),
                }
            })?;
            return Ok(RefundReceipt {
                refund_id: parsed.id,
                gateway_status: parsed.status,
            });
        }

        // 5xx 视为网关瞬时故障可重试；4xx 是业务拒绝直接失败
        if status.is_server_error() {
            return Err(OrderError::PaymentGatewayTimeout);
        }

        let message = match response.json::<RazorpayErrorResponse>().await {
            Ok(err) => format!("{}: {}", err.error.code, err.error.description),
            Err(_) => format!("网关返回 HTTP {}", status.as_u16()),
        };
        Err(OrderError::PaymentGateway { message })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self), fields(
        payment_reference = %request.payment_reference,
        amount_minor = request.amount_minor,
        cancellation_id = request.cancellation_id,
    ))]
    async fn refund(&self, request: &RefundRequest) -> Result<RefundReceipt> {
        let receipt = retry_with_policy(
            &self.retry_policy,
            "razorpay_refund",
            OrderError::is_retryable,
            || self.refund_once(request),
        )
        .await
        .inspect_err(|e| {
            warn!(error = %e, "退款发起失败");
        })?;

        info!(
            refund_id = %receipt.refund_id,
            gateway_status = %receipt.gateway_status,
            "网关已受理退款"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client =
            RazorpayClient::new("https://api.razorpay.com/v1/", "rzp_test_key", "secret", 10)
                .expect("创建客户端失败");
        assert_eq!(client.base_url, "https://api.razorpay.com/v1");
    }

    #[test]
    fn test_refund_url_shape() {
        let client =
            RazorpayClient::new("https://api.razorpay.com/v1", "rzp_test_key", "secret", 10)
                .expect("创建客户端失败");
        let url = format!("{}/payments/{}/refund", client.base_url, "pay_abc123");
        assert_eq!(url, "https://api.razorpay.com/v1/payments/pay_abc123/refund");
    }
}
