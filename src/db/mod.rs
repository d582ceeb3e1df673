//! Database access layer
//!
//! Connection pooling plus the repository implementations backing the post
//! service. The traits live here so the service layer stays free of any
//! persistence coupling.

pub mod post_repo;
pub mod user_directory;

use crate::config::DatabaseConfig;
use crate::error::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use post_repo::{PgPostRepository, PostRepository};
pub use user_directory::{PgUserDirectory, UserDirectory};

/// Create a Postgres connection pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    Ok(pool)
}
