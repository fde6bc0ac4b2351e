//! 取消单仓储
//!
//! 关键点是"同一订单至多一条进行中取消单"的不变式：不靠先查后插，
//! 而是依赖部分唯一索引 uq_order_cancellations_active 做原子条件插入，
//! 唯一键冲突直接映射为 DuplicateCancellation。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Row};

use super::traits::CancellationRepositoryTrait;
use crate::error::{OrderError, Result};
use crate::models::{
    CancelItem, CancellationStatus, CancellationType, OrderCancellation, RefundStatus,
};

/// 待插入的取消单
#[derive(Debug, Clone)]
pub struct NewCancellation {
    pub order_id: i64,
    pub order_number: String,
    pub user_id: Option<i64>,
    pub reason: String,
    pub cancel_type: CancellationType,
    pub items: Option<Vec<CancelItem>>,
    pub refund_amount: f64,
    /// 申请路径插入 PENDING；立即取消路径插入 APPROVED（自动批准）
    pub status: CancellationStatus,
}

/// 取消单仓储
pub struct CancellationRepository {
    pool: PgPool,
}

const SELECT_COLUMNS: &str = r#"
    id, order_id, order_number, user_id, reason, cancel_type, items,
    refund_amount, status, refund_status, refund_id, admin_notes,
    processed_by, processed_at, created_at
"#;

impl CancellationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中原子插入取消单
    ///
    /// 命中部分唯一索引（该订单已有 PENDING/APPROVED 取消单）时返回
    /// DuplicateCancellation，并发的重复申请只会有一个成功。
    pub async fn create_in_tx(
        tx: &mut PgConnection,
        new: &NewCancellation,
    ) -> Result<OrderCancellation> {
        let row = sqlx::query_as::<_, OrderCancellation>(&format!(
            r#"
            INSERT INTO order_cancellations
                (order_id, order_number, user_id, reason, cancel_type, items,
                 refund_amount, status, refund_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (order_id) WHERE status IN ('PENDING', 'APPROVED') DO NOTHING
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(new.order_id)
        .bind(&new.order_number)
        .bind(new.user_id)
        .bind(&new.reason)
        .bind(new.cancel_type)
        .bind(new.items.as_ref().map(|items| Json(items.clone())))
        .bind(new.refund_amount)
        .bind(new.status)
        .bind(RefundStatus::None)
        .bind(Utc::now())
        .fetch_optional(tx)
        .await?;

        row.ok_or_else(|| OrderError::DuplicateCancellation {
            order_number: new.order_number.clone(),
        })
    }

    /// 在事务中按 ID 加行级锁读取
    pub async fn get_for_update_in_tx(
        tx: &mut PgConnection,
        id: i64,
    ) -> Result<Option<OrderCancellation>> {
        let record = sqlx::query_as::<_, OrderCancellation>(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_cancellations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(record)
    }

    /// 在事务中落审批决策
    pub async fn apply_decision_in_tx(
        tx: &mut PgConnection,
        id: i64,
        status: CancellationStatus,
        admin_notes: Option<&str>,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE order_cancellations
            SET status = $2, admin_notes = $3, processed_by = $4, processed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(admin_notes)
        .bind(processed_by)
        .bind(processed_at)
        .execute(tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CancellationRepositoryTrait for CancellationRepository {
    async fn get(&self, id: i64) -> Result<Option<OrderCancellation>> {
        let record = sqlx::query_as::<_, OrderCancellation>(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_cancellations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn set_refund_result(
        &self,
        id: i64,
        refund_status: RefundStatus,
        refund_id: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE order_cancellations SET refund_status = $2, refund_id = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(refund_status)
        .bind(refund_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(
        &self,
        status: Option<CancellationStatus>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderCancellation>, i64)> {
        let offset = (page.max(1) - 1) * page_size;

        let records = sqlx::query_as::<_, OrderCancellation>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM order_cancellations
            WHERE ($1::varchar IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total FROM order_cancellations
            WHERE ($1::varchar IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?
        .get("total");

        Ok((records, total))
    }
}
