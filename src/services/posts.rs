//! Post service - post lifecycle and search
//!
//! Sole orchestration point over the post repository, the user directory,
//! and the image store. Enforces ownership and existence and maps entities
//! into response projections.

use crate::db::{PostRepository, UserDirectory};
use crate::error::{AppError, Result};
use crate::models::{ImageUpload, NewPost, Post, PostRequest, PostResponse, SearchType, User};
use crate::storage::ImageStore;
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserDirectory>,
    images: Arc<dyn ImageStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserDirectory>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            posts,
            users,
            images,
        }
    }

    /// Wire the service to the Postgres-backed collaborators
    pub fn with_postgres(pool: sqlx::PgPool, image_base_url: impl Into<String>) -> Self {
        use crate::db::{PgPostRepository, PgUserDirectory};
        use crate::storage::PgImageStore;

        Self::new(
            Arc::new(PgPostRepository::new(pool.clone())),
            Arc::new(PgUserDirectory::new(pool.clone())),
            Arc::new(PgImageStore::new(pool, image_base_url)),
        )
    }

    /// Create a new post owned by the requesting user.
    ///
    /// The post row and its image association are persisted in one atomic
    /// unit; a failed image write leaves no visible post behind.
    pub async fn create_post(
        &self,
        request: PostRequest,
        user: &User,
        image: ImageUpload,
    ) -> Result<Post> {
        let new_post = NewPost {
            user_id: user.id,
            title: request.title,
            content: request.content,
        };

        let post = self.posts.create_with_image(new_post, &image).await?;
        tracing::info!(post_id = %post.id, user_id = %user.id, "post created");

        Ok(post)
    }

    /// All active posts, newest first, each with its resolved image URL.
    ///
    /// A post without an image gets `image_url: None`; a stored image
    /// reference that cannot be resolved aborts the entire listing.
    pub async fn get_all_posts(&self) -> Result<Vec<PostResponse>> {
        let posts = self.posts.find_all_active().await?;

        let mut responses = Vec::with_capacity(posts.len());
        for post in posts {
            let image_url = self.images.resolve_url(post.id).await?;
            responses.push(PostResponse::new(&post, image_url));
        }

        Ok(responses)
    }

    /// One active post with its resolved image URL
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostResponse> {
        let post = self
            .posts
            .find_active_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no active post with id {post_id}")))?;

        let image_url = self
            .images
            .resolve_url(post.id)
            .await?
            .ok_or_else(|| {
                AppError::ImageResolution(format!("no image stored for post {post_id}"))
            })?;

        Ok(PostResponse::new(&post, Some(image_url)))
    }

    /// Replace a post's image and overwrite its fields.
    ///
    /// The image is replaced before ownership is validated and is not rolled
    /// back when the requester turns out not to be the owner.
    pub async fn update_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        request: PostRequest,
        image: ImageUpload,
    ) -> Result<()> {
        let post = self.find_post(post_id).await?;

        self.images.replace(post.id, &image).await?;
        self.validate_owner(user_id, &post)?;
        self.posts.update_fields(post.id, &request).await?;

        tracing::info!(post_id = %post.id, user_id = %user_id, "post updated");
        Ok(())
    }

    /// Keyword search, dispatched on the search type.
    ///
    /// `"nickname"` returns one inner list per matching user, in directory
    /// order, each holding that user's posts; `"title"` returns a single
    /// inner list of title matches. Neither predicate filters soft-deleted
    /// posts.
    pub async fn search_post(
        &self,
        search_type: &str,
        keyword: &str,
    ) -> Result<Vec<Vec<PostResponse>>> {
        match SearchType::try_from(search_type)? {
            SearchType::Nickname => {
                let users = self.users.find_users_where_nickname_contains(keyword).await?;

                let mut result = Vec::with_capacity(users.len());
                for user in users {
                    let posts = self.posts.find_by_owner(user.id).await?;
                    result.push(self.project_for_search(posts).await?);
                }
                Ok(result)
            }
            SearchType::Title => {
                let posts = self.posts.find_by_title_contains(keyword).await?;
                Ok(vec![self.project_for_search(posts).await?])
            }
        }
    }

    /// Soft-delete a post owned by the requesting user.
    ///
    /// Deleting a post that is already soft-deleted does not move the
    /// delete timestamp.
    pub async fn delete_post(&self, user: &User, post_id: Uuid) -> Result<()> {
        let post = self.find_post(post_id).await?;
        self.validate_owner(user.id, &post)?;
        self.posts.soft_delete(post.id).await?;

        tracing::info!(post_id = %post.id, user_id = %user.id, "post soft-deleted");
        Ok(())
    }

    /// Locate a post by id regardless of delete status
    pub async fn find_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no post with id {post_id}")))
    }

    fn validate_owner(&self, user_id: Uuid, post: &Post) -> Result<()> {
        if post.user_id != user_id {
            tracing::warn!(
                post_id = %post.id,
                owner_id = %post.user_id,
                requester_id = %user_id,
                "ownership check failed"
            );
            return Err(AppError::Forbidden("not the author of this post".into()));
        }
        Ok(())
    }

    // image failures on the search path surface as the user-error kind
    async fn project_for_search(&self, posts: Vec<Post>) -> Result<Vec<PostResponse>> {
        let mut responses = Vec::with_capacity(posts.len());
        for post in posts {
            let image_url = self.images.resolve_url(post.id).await.map_err(|err| {
                tracing::warn!(post_id = %post.id, "image resolution failed during search: {}", err);
                AppError::Forbidden(format!("post {} has no resolvable image", post.id))
            })?;
            responses.push(PostResponse::new(&post, image_url));
        }
        Ok(responses)
    }
}
