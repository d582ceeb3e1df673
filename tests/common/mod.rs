//! In-memory collaborators for post service tests
//!
//! One backend struct stands in for the post repository, the user directory,
//! and the image store, so a test can observe both sides of an operation
//! (e.g. the image row written by a rejected update). Failure modes are
//! switchable per test: image writes can be made to fail and individual
//! stored images can be marked unresolvable.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use post_service::db::{PostRepository, UserDirectory};
use post_service::error::{AppError, Result};
use post_service::models::{ImageUpload, NewPost, Post, PostRequest, User};
use post_service::storage::ImageStore;
use post_service::PostService;

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Default)]
pub struct InMemoryBackend {
    posts: Mutex<Vec<Post>>,
    users: Mutex<Vec<User>>,
    images: Mutex<HashMap<Uuid, StoredImage>>,
    broken_images: Mutex<HashSet<Uuid>>,
    fail_image_writes: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, nickname: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            nickname: nickname.to_string(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    /// Make every subsequent image write fail
    pub fn fail_image_writes(&self) {
        self.fail_image_writes.store(true, Ordering::SeqCst);
    }

    /// Mark a stored image as unresolvable
    pub fn break_image(&self, post_id: Uuid) {
        self.broken_images.lock().unwrap().insert(post_id);
    }

    /// Drop the image association of a post
    pub fn remove_image(&self, post_id: Uuid) {
        self.images.lock().unwrap().remove(&post_id);
    }

    /// Read a post row directly, bypassing the active-only filters
    pub fn raw_post(&self, post_id: Uuid) -> Option<Post> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned()
    }

    pub fn stored_image(&self, post_id: Uuid) -> Option<StoredImage> {
        self.images.lock().unwrap().get(&post_id).cloned()
    }

    fn resolved_url(&self, post_id: Uuid, image: &StoredImage) -> String {
        format!(
            "http://images.test/posts/{}/image/{}",
            post_id, image.file_name
        )
    }
}

/// Wire a service to one shared in-memory backend
pub fn service(backend: &Arc<InMemoryBackend>) -> PostService {
    PostService::new(backend.clone(), backend.clone(), backend.clone())
}

/// Newest first, with insertion order as the tie-breaker
fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.reverse();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl PostRepository for InMemoryBackend {
    async fn create_with_image(&self, post: NewPost, image: &ImageUpload) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.posts.lock().unwrap().push(post.clone());

        if self.fail_image_writes.load(Ordering::SeqCst) {
            // the two writes share one transaction: roll the post row back
            self.posts.lock().unwrap().retain(|p| p.id != post.id);
            return Err(AppError::Internal("image write failed".into()));
        }

        self.images.lock().unwrap().insert(
            post.id,
            StoredImage {
                file_name: image.file_name.clone(),
                content_type: image.content_type.clone(),
                data: image.data.clone(),
            },
        );

        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.raw_post(id))
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.raw_post(id).filter(|p| p.deleted_at.is_none()))
    }

    async fn find_all_active(&self) -> Result<Vec<Post>> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn find_by_title_contains(&self, keyword: &str) -> Result<Vec<Post>> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.title.contains(keyword))
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn update_fields(&self, id: Uuid, request: &PostRequest) -> Result<()> {
        let mut posts = self.posts.lock().unwrap();
        if let Some(post) = posts.iter_mut().find(|p| p.id == id) {
            post.title = request.title.clone();
            post.content = request.content.clone();
            post.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let mut posts = self.posts.lock().unwrap();
        if let Some(post) = posts.iter_mut().find(|p| p.id == id) {
            if post.deleted_at.is_none() {
                post.deleted_at = Some(Utc::now());
                post.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryBackend {
    async fn find_users_where_nickname_contains(&self, keyword: &str) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.nickname.contains(keyword))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ImageStore for InMemoryBackend {
    async fn resolve_url(&self, post_id: Uuid) -> Result<Option<String>> {
        if self.broken_images.lock().unwrap().contains(&post_id) {
            return Err(AppError::ImageResolution(format!(
                "unreadable image reference for post {post_id}"
            )));
        }

        let images = self.images.lock().unwrap();
        Ok(images
            .get(&post_id)
            .map(|image| self.resolved_url(post_id, image)))
    }

    async fn replace(&self, post_id: Uuid, image: &ImageUpload) -> Result<()> {
        if self.fail_image_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("image write failed".into()));
        }

        self.images.lock().unwrap().insert(
            post_id,
            StoredImage {
                file_name: image.file_name.clone(),
                content_type: image.content_type.clone(),
                data: image.data.clone(),
            },
        );
        Ok(())
    }
}
