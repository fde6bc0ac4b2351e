//! 渠道发送器
//!
//! 每个渠道一个发送器实现。邮件与 WhatsApp 的真实供应商对接尚未就绪，
//! 当前实现只输出结构化日志，接口形态与未来的真实实现保持一致。

use async_trait::async_trait;
use nefol_shared::events::{NotificationChannel, NotificationEvent};
use tracing::info;

use crate::error::Result;

/// 单渠道发送器接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 该发送器负责的渠道
    fn channel(&self) -> NotificationChannel;

    /// 投递一条通知
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
}

/// 站内通知发送器
#[derive(Default)]
pub struct InAppSender;

#[async_trait]
impl NotificationSink for InAppSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::InApp
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        info!(
            notification_id = %event.notification_id,
            notification_type = %event.notification_type,
            order_number = %event.order_number,
            title = %event.title,
            "投递站内通知"
        );
        Ok(())
    }
}

/// 邮件发送器
#[derive(Default)]
pub struct EmailSender;

#[async_trait]
impl NotificationSink for EmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        info!(
            notification_id = %event.notification_id,
            notification_type = %event.notification_type,
            order_number = %event.order_number,
            user_id = ?event.user_id,
            "投递邮件通知"
        );
        Ok(())
    }
}

/// WhatsApp 发送器
#[derive(Default)]
pub struct WhatsappSender;

#[async_trait]
impl NotificationSink for WhatsappSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Whatsapp
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        info!(
            notification_id = %event.notification_id,
            notification_type = %event.notification_type,
            order_number = %event.order_number,
            user_id = ?event.user_id,
            "投递 WhatsApp 通知"
        );
        Ok(())
    }
}
