//! 用户实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 平台用户
///
/// coin_balance 是账本的派生运行总额，必须与账本流水同事务更新
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[sqlx(default)]
    pub email: Option<String>,
    pub coin_balance: i64,
    pub created_at: DateTime<Utc>,
}
