//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserRepositoryTrait;
use crate::error::Result;
use crate::models::User;

/// 用户仓储
pub struct UserRepository {
    pool: PgPool,
}

const SELECT_COLUMNS: &str = "id, name, phone, email, coin_balance, created_at";

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_contact(&self, phone: &str, email: Option<String>) -> Result<Option<User>> {
        // 电话精确匹配优先；邮箱匹配大小写不敏感
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM users
            WHERE phone = $1 OR ($2::varchar IS NOT NULL AND LOWER(email) = LOWER($2))
            ORDER BY (phone = $1) DESC
            LIMIT 1
            "#
        ))
        .bind(phone)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
