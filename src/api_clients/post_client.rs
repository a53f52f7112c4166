//! # Post API Client
//!
//! Client for the post service: creation, lookup, deletion and the per-user
//! and per-post listings.

use reqwest::{Method, StatusCode};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::common::{ApiResponse, ServiceClient};
use crate::config::AuthConfig;
use crate::error::HarnessResult;
use crate::models::{CreatedPost, NewPost, PostRecord};

#[derive(Debug, Clone)]
pub struct PostApiClient {
    inner: ServiceClient,
}

impl PostApiClient {
    pub fn new(base_url: &str, timeout: Duration, auth: &AuthConfig) -> HarnessResult<Self> {
        Ok(Self {
            inner: ServiceClient::new("post", base_url, timeout, auth)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url().as_str()
    }

    /// POST /api/posts
    pub async fn create_post(&self, author: Uuid, post: &NewPost) -> HarnessResult<ApiResponse> {
        let url = self.inner.url("/api/posts")?;
        debug!(
            url = %url,
            author = %author,
            reply_id = ?post.reply_id,
            repost_id = ?post.repost_id,
            "Creating post"
        );

        let builder = self
            .inner
            .request(Method::POST, url, Some(author))
            .multipart(post.to_form()?);
        self.inner.execute(builder, "create post").await
    }

    /// POST /api/posts, expecting `201` and a post identifier
    pub async fn create_post_id(&self, author: Uuid, post: &NewPost) -> HarnessResult<Uuid> {
        let created: CreatedPost = self
            .create_post(author, post)
            .await?
            .ensure_status(StatusCode::CREATED)?
            .json()?;

        info!(post_id = %created.post_id, author = %author, "Created post");
        Ok(created.post_id)
    }

    /// GET /api/posts/{post_id}
    pub async fn get_post(&self, as_user: Uuid, post_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(&format!("/api/posts/{post_id}"))?;
        let builder = self.inner.request(Method::GET, url, Some(as_user));
        self.inner.execute(builder, "get post").await
    }

    /// GET /api/posts/{post_id}, expecting `200`
    pub async fn fetch_post(&self, as_user: Uuid, post_id: Uuid) -> HarnessResult<PostRecord> {
        self.get_post(as_user, post_id)
            .await?
            .ensure_status(StatusCode::OK)?
            .json()
    }

    /// DELETE /api/posts/{post_id}
    pub async fn delete_post(&self, as_user: Uuid, post_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(&format!("/api/posts/{post_id}"))?;
        let builder = self.inner.request(Method::DELETE, url, Some(as_user));
        self.inner.execute(builder, "delete post").await
    }

    /// GET /api/users/{user_id}/posts
    pub async fn list_user_posts(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(&format!("/api/users/{user_id}/posts"))?;
        let builder = self.inner.request(Method::GET, url, None);
        self.inner.execute(builder, "list user posts").await
    }

    /// GET /api/posts/{post_id}/replies
    pub async fn list_replies(&self, post_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(&format!("/api/posts/{post_id}/replies"))?;
        let builder = self.inner.request(Method::GET, url, None);
        self.inner.execute(builder, "list replies").await
    }

    /// GET /api/posts/{post_id}/reposts
    pub async fn list_reposts(&self, post_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(&format!("/api/posts/{post_id}/reposts"))?;
        let builder = self.inner.request(Method::GET, url, None);
        self.inner.execute(builder, "list reposts").await
    }
}
