//! Post Service Library
//!
//! CRUD, search, and soft-delete for user-authored posts with an attached
//! image, as consumed by a content-recommendation web application. The
//! hosting app provides HTTP routing and authentication; this crate provides
//! the service layer and its persistence adapters.
//!
//! # Modules
//!
//! - `services`: Business logic layer (the post service itself)
//! - `models`: Data structures for posts, users, and request/response DTOs
//! - `db`: Database access layer and repositories
//! - `storage`: Image association storage and URL resolution
//! - `error`: Error types and handling
//! - `config`: Configuration management

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::PostService;

/// Install the global tracing subscriber; the hosting app calls this once.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
