//! Data models for the post service
//!
//! This module defines structures for:
//! - Post: user-authored content with an attached image
//! - User: the slice of the user directory this service reads
//! - Request/response DTOs exchanged with the hosting app

use crate::error::AppError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post database entity
///
/// `deleted_at` is the soft-delete marker: `None` means active, and once it
/// is set it is never cleared.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Fields needed to persist a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
}

/// User directory entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub nickname: String,
}

/// Request payload for creating or updating a post
#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

/// An uploaded image file, as handed over by the hosting app
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Post response DTO
///
/// Projection of a post plus its resolved image URL, built per request.
/// `image_url` is `None` when the post has no stored image.
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: &Post, image_url: Option<String>) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            title: post.title.clone(),
            content: post.content.clone(),
            image_url,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Search predicate selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Nickname,
    Title,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Nickname => "nickname",
            SearchType::Title => "title",
        }
    }
}

impl TryFrom<&str> for SearchType {
    type Error = AppError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "nickname" => Ok(SearchType::Nickname),
            "title" => Ok(SearchType::Title),
            other => Err(AppError::InvalidInput(format!(
                "unknown search type: {other}"
            ))),
        }
    }
}

/// Response envelope served by the hosting app
#[derive(Debug, Serialize)]
pub struct CommonResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> CommonResponse<T> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            message: None,
            data: Some(data),
        }
    }
}
