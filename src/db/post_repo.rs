//! Post repository
//!
//! Persistent collection of post records. Soft-deleted rows stay in the
//! table; the `find_active_*` lookups filter them out while the plain
//! lookups see every row.

use crate::error::Result;
use crate::models::{ImageUpload, NewPost, Post, PostRequest};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post together with its image association.
    ///
    /// Both writes commit in one transaction: either the post row and the
    /// image row are both visible afterwards, or neither is.
    async fn create_with_image(&self, post: NewPost, image: &ImageUpload) -> Result<Post>;

    /// Find a post by id regardless of delete status
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    /// Find a post by id, excluding soft-deleted rows
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    /// All active posts, newest first
    async fn find_all_active(&self) -> Result<Vec<Post>>;

    /// All posts owned by a user, regardless of delete status
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Post>>;

    /// All posts whose title contains the keyword, regardless of delete status
    async fn find_by_title_contains(&self, keyword: &str) -> Result<Vec<Post>>;

    /// Overwrite the mutable fields of a post
    async fn update_fields(&self, id: Uuid, request: &PostRequest) -> Result<()>;

    /// Mark a post deleted. A second call leaves the original timestamp.
    async fn soft_delete(&self, id: Uuid) -> Result<()>;
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_with_image(&self, post: NewPost, image: &ImageUpload) -> Result<Post> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, user_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, user_id, title, content, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO post_images (post_id, file_name, content_type, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            "#,
        )
        .bind(post.id)
        .bind(&image.file_name)
        .bind(&image.content_type)
        .bind(image.data.as_ref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at, deleted_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at, deleted_at
            FROM posts
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_all_active(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at, deleted_at
            FROM posts
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at, deleted_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_by_title_contains(&self, keyword: &str) -> Result<Vec<Post>> {
        // case-sensitivity follows the database collation
        let pattern = format!("%{}%", keyword);

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at, deleted_at
            FROM posts
            WHERE title LIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn update_fields(&self, id: Uuid, request: &PostRequest) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&request.title)
        .bind(&request.content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
