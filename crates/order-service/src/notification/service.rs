//! 通知服务
//!
//! dispatch 的失败语义：持久化失败或渠道投递失败都只记 warn 日志。
//! 取消与退款的最终状态在调用 dispatch 之前已经落库，通知永远不能
//! 反向影响它们。

use std::sync::Arc;

use chrono::Utc;
use nefol_shared::events::NotificationEvent;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::sender::NotificationSink;

/// 通知服务
pub struct NotificationService {
    pool: PgPool,
    senders: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationService {
    pub fn new(pool: PgPool, senders: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { pool, senders }
    }

    /// 分发一条通知事件
    #[instrument(skip(self, event), fields(
        notification_id = %event.notification_id,
        notification_type = %event.notification_type,
        order_number = %event.order_number,
    ))]
    pub async fn dispatch(&self, event: &NotificationEvent) {
        // 1. 持久化通知记录
        if let Err(e) = self.persist(event).await {
            warn!(error = %e, "通知记录持久化失败，继续尝试投递");
        }

        // 2. 按事件声明的渠道逐个投递，单渠道失败不影响其余渠道
        for sender in &self.senders {
            if !event.channels.contains(&sender.channel()) {
                continue;
            }
            match sender.send(event).await {
                Ok(()) => {
                    debug!(channel = ?sender.channel(), "渠道投递成功");
                }
                Err(e) => {
                    warn!(channel = ?sender.channel(), error = %e, "渠道投递失败");
                }
            }
        }
    }

    async fn persist(&self, event: &NotificationEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications
                (notification_id, notification_type, audience, user_id,
                 title, body, order_number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&event.notification_id)
        .bind(event.notification_type.to_string())
        .bind(format!("{:?}", event.audience).to_uppercase())
        .bind(event.user_id)
        .bind(&event.title)
        .bind(&event.body)
        .bind(&event.order_number)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
