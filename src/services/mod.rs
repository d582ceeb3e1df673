//! Business logic layer
//!
//! The post service is the only orchestration point; everything it talks to
//! sits behind the repository and storage traits.

pub mod posts;

pub use posts::PostService;
