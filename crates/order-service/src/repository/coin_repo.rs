//! 金币账本仓储
//!
//! 余额是随账本维护的派生运行总额，不从账本重算。任何一次余额变动
//! 都必须和对应的账本追加在同一个事务内提交，否则两者会漂移。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::traits::CoinRepositoryTrait;
use crate::error::Result;
use crate::models::{CoinTransaction, CoinTxStatus, CoinTxType};

/// 金币账本仓储
pub struct CoinRepository {
    pool: PgPool,
}

const SELECT_COLUMNS: &str = r#"
    id, user_id, amount, tx_type, description, status, order_id, created_at
"#;

impl CoinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoinRepositoryTrait for CoinRepository {
    async fn adjust_balance(
        &self,
        user_id: i64,
        delta: i64,
        tx_type: CoinTxType,
        description: String,
        order_id: Option<i64>,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        // 余额更新与账本追加同事务提交
        let row = sqlx::query(
            r#"
            UPDATE users
            SET coin_balance = coin_balance + $2
            WHERE id = $1
            RETURNING coin_balance
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        let new_balance: i64 = row.get("coin_balance");

        sqlx::query(
            r#"
            INSERT INTO coin_transactions
                (user_id, amount, tx_type, description, status, order_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .bind(tx_type)
        .bind(&description)
        .bind(CoinTxStatus::Completed)
        .bind(order_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(new_balance)
    }

    async fn find_latest_positive(
        &self,
        user_id: i64,
        order_id: i64,
        tx_type: CoinTxType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<CoinTransaction>> {
        let record = sqlx::query_as::<_, CoinTransaction>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM coin_transactions
            WHERE user_id = $1
              AND order_id = $2
              AND tx_type = $3
              AND amount > 0
              AND ($4::timestamptz IS NULL OR created_at >= $4)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(order_id)
        .bind(tx_type)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
