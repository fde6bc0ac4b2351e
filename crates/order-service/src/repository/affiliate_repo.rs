//! 分销伙伴仓储

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::traits::AffiliateRepositoryTrait;
use crate::error::Result;
use crate::models::AffiliatePartner;

/// 分销伙伴仓储
pub struct AffiliateRepository {
    pool: PgPool,
}

impl AffiliateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AffiliateRepositoryTrait for AffiliateRepository {
    async fn get(&self, id: i64) -> Result<Option<AffiliatePartner>> {
        let partner = sqlx::query_as::<_, AffiliatePartner>(
            r#"
            SELECT id, user_id, code, total_referrals, total_earnings,
                   pending_earnings, created_at
            FROM affiliate_partners
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(partner)
    }

    async fn apply_reversal(&self, partner_id: i64, earnings_delta: f64) -> Result<()> {
        // GREATEST 下取整到 0：历史手工调账可能导致计数不足额
        sqlx::query(
            r#"
            UPDATE affiliate_partners
            SET total_referrals = GREATEST(total_referrals - 1, 0),
                total_earnings = GREATEST(total_earnings - $2, 0),
                pending_earnings = GREATEST(pending_earnings - $2, 0),
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(partner_id)
        .bind(earnings_delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
