//! 订单仓储
//!
//! 取消编排器对订单的访问面很窄：按订单号读取、锁行、迁移到已取消、
//! 翻转可取消标记。订单的创建与履约推进属于下单子系统，不在此处。

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use super::traits::OrderRepositoryTrait;
use crate::error::Result;
use crate::models::{Order, OrderStatus};

/// 订单仓储
pub struct OrderRepository {
    pool: PgPool,
}

const SELECT_COLUMNS: &str = r#"
    id, order_number, user_id, customer_name, customer_phone, customer_email,
    status, items, total, coins_used, affiliate_id, payment_method,
    payment_reference, can_cancel, delivered_at, created_at
"#;

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中按订单号加行级锁读取
    ///
    /// 取消编排在同一事务内随后会改写订单状态，加锁避免并发编排互踩
    pub async fn get_by_number_for_update_in_tx(
        tx: &mut PgConnection,
        order_number: &str,
    ) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE order_number = $1 FOR UPDATE"
        ))
        .bind(order_number)
        .fetch_optional(tx)
        .await?;

        Ok(order)
    }

    /// 在事务中把订单迁移到已取消终态
    ///
    /// 同时关闭可取消标记，阻断后续任何取消入口
    pub async fn set_cancelled_in_tx(tx: &mut PgConnection, order_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, can_cancel = FALSE, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(OrderStatus::Cancelled)
        .bind(Utc::now())
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 在事务中翻转可取消标记（履约状态不变）
    pub async fn set_can_cancel_in_tx(
        tx: &mut PgConnection,
        order_id: i64,
        can_cancel: bool,
    ) -> Result<()> {
        sqlx::query("UPDATE orders SET can_cancel = $2, updated_at = $3 WHERE id = $1")
            .bind(order_id)
            .bind(can_cancel)
            .bind(Utc::now())
            .execute(tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}
