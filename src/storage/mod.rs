//! Image storage
//!
//! Each post has at most one image, keyed by post id. The bytes live in the
//! `post_images` table so the create path can commit the post row and the
//! association in one transaction; reads only ever derive a resolvable URL.

use crate::error::{AppError, Result};
use crate::models::ImageUpload;
use async_trait::async_trait;
use sqlx::PgPool;
use url::Url;
use uuid::Uuid;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Resolve the public URL of a post's image.
    ///
    /// Returns `Ok(None)` when no image is stored for the post, and
    /// `AppError::ImageResolution` when a stored reference cannot be turned
    /// into a valid URL.
    async fn resolve_url(&self, post_id: Uuid) -> Result<Option<String>>;

    /// Store or overwrite the image associated with a post
    async fn replace(&self, post_id: Uuid, image: &ImageUpload) -> Result<()>;
}

pub struct PgImageStore {
    pool: PgPool,
    public_base_url: String,
}

impl PgImageStore {
    pub fn new(pool: PgPool, public_base_url: impl Into<String>) -> Self {
        Self {
            pool,
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn resolve_url(&self, post_id: Uuid) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT file_name FROM post_images WHERE post_id = $1")
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((file_name,)) => {
                build_image_url(&self.public_base_url, post_id, &file_name).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn replace(&self, post_id: Uuid, image: &ImageUpload) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO post_images (post_id, file_name, content_type, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (post_id) DO UPDATE
            SET file_name = EXCLUDED.file_name,
                content_type = EXCLUDED.content_type,
                data = EXCLUDED.data,
                updated_at = NOW()
            "#,
        )
        .bind(post_id)
        .bind(&image.file_name)
        .bind(&image.content_type)
        .bind(image.data.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Build the public URL for a stored image file
pub(crate) fn build_image_url(base: &str, post_id: Uuid, file_name: &str) -> Result<String> {
    if file_name.is_empty() {
        return Err(AppError::ImageResolution(format!(
            "post {post_id} has an image record without a file name"
        )));
    }

    let mut base = base.trim_end_matches('/').to_string();
    base.push('/');
    let base = Url::parse(&base).map_err(|e| {
        AppError::ImageResolution(format!("invalid image base URL {base:?}: {e}"))
    })?;

    let url = base
        .join(&format!("posts/{post_id}/image/{file_name}"))
        .map_err(|e| {
            AppError::ImageResolution(format!("cannot resolve image URL for post {post_id}: {e}"))
        })?;

    Ok(url.to_string())
}
