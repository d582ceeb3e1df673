//! User directory
//!
//! Read-only lookup into the user store. The post service only needs
//! substring search over display names for the nickname search path.

use crate::error::Result;
use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every user whose nickname contains the keyword
    async fn find_users_where_nickname_contains(&self, keyword: &str) -> Result<Vec<User>>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_users_where_nickname_contains(&self, keyword: &str) -> Result<Vec<User>> {
        // case-sensitivity follows the database collation
        let pattern = format!("%{}%", keyword);

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nickname
            FROM users
            WHERE nickname LIKE $1
            ORDER BY nickname
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
