//! # Social Graph API Client
//!
//! Follow, block and like relations. Relation targets are sent as a bare
//! JSON string body (`"<uuid>"`), like posts as `{"postId": "<uuid>"}`.

use reqwest::Method;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::common::{ApiResponse, ServiceClient};
use crate::config::AuthConfig;
use crate::error::HarnessResult;

#[derive(Debug, Clone)]
pub struct SocialApiClient {
    inner: ServiceClient,
}

impl SocialApiClient {
    pub fn new(base_url: &str, timeout: Duration, auth: &AuthConfig) -> HarnessResult<Self> {
        Ok(Self {
            inner: ServiceClient::new("social", base_url, timeout, auth)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url().as_str()
    }

    async fn relation(
        &self,
        method: Method,
        path: &str,
        as_user: Uuid,
        target: Uuid,
        operation: &str,
    ) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(path)?;
        debug!(url = %url, as_user = %as_user, target = %target, "{}", operation);

        let builder = self.inner.request(method, url, Some(as_user)).json(&target);
        self.inner.execute(builder, operation).await
    }

    /// POST /api/repo-social/users/follow
    pub async fn follow(&self, as_user: Uuid, followee: Uuid) -> HarnessResult<ApiResponse> {
        self.relation(
            Method::POST,
            "/api/repo-social/users/follow",
            as_user,
            followee,
            "follow user",
        )
        .await
    }

    /// DELETE /api/repo-social/users/unfollow
    pub async fn unfollow(&self, as_user: Uuid, followee: Uuid) -> HarnessResult<ApiResponse> {
        self.relation(
            Method::DELETE,
            "/api/repo-social/users/unfollow",
            as_user,
            followee,
            "unfollow user",
        )
        .await
    }

    /// POST /api/repo-social/users/block
    pub async fn block(&self, as_user: Uuid, blocked: Uuid) -> HarnessResult<ApiResponse> {
        self.relation(
            Method::POST,
            "/api/repo-social/users/block",
            as_user,
            blocked,
            "block user",
        )
        .await
    }

    /// DELETE /api/repo-social/users/unblock
    pub async fn unblock(&self, as_user: Uuid, blocked: Uuid) -> HarnessResult<ApiResponse> {
        self.relation(
            Method::DELETE,
            "/api/repo-social/users/unblock",
            as_user,
            blocked,
            "unblock user",
        )
        .await
    }

    async fn user_listing(
        &self,
        user_id: Uuid,
        suffix: &str,
        operation: &str,
    ) -> HarnessResult<ApiResponse> {
        let url = self
            .inner
            .url(&format!("/api/repo-social/users/{user_id}/{suffix}"))?;
        let builder = self.inner.request(Method::GET, url, None);
        self.inner.execute(builder, operation).await
    }

    /// GET /api/repo-social/users/{user_id}/followers
    pub async fn followers(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        self.user_listing(user_id, "followers", "list followers")
            .await
    }

    /// GET /api/repo-social/users/{user_id}/follows
    pub async fn follows(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        self.user_listing(user_id, "follows", "list followees").await
    }

    /// GET /api/repo-social/users/{user_id}/blocks
    pub async fn blocks(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        self.user_listing(user_id, "blocks", "list blocked users")
            .await
    }

    /// GET /api/repo-social/users/{user_id}/blocked
    pub async fn blocked_by(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        self.user_listing(user_id, "blocked", "list blockers").await
    }

    /// GET /api/repo-social/users/{user_id}/likes
    pub async fn liked_posts(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        self.user_listing(user_id, "likes", "list liked posts").await
    }

    async fn like_relation(
        &self,
        method: Method,
        path: &str,
        as_user: Uuid,
        post_id: Uuid,
        operation: &str,
    ) -> HarnessResult<ApiResponse> {
        let url = self.inner.url(path)?;
        let builder = self
            .inner
            .request(method, url, Some(as_user))
            .json(&json!({ "postId": post_id }));
        self.inner.execute(builder, operation).await
    }

    /// POST /api/repo-social/posts/like
    pub async fn like_post(&self, as_user: Uuid, post_id: Uuid) -> HarnessResult<ApiResponse> {
        self.like_relation(
            Method::POST,
            "/api/repo-social/posts/like",
            as_user,
            post_id,
            "like post",
        )
        .await
    }

    /// DELETE /api/repo-social/posts/unlike
    pub async fn unlike_post(&self, as_user: Uuid, post_id: Uuid) -> HarnessResult<ApiResponse> {
        self.like_relation(
            Method::DELETE,
            "/api/repo-social/posts/unlike",
            as_user,
            post_id,
            "unlike post",
        )
        .await
    }

    /// GET /api/repo-social/posts/{post_id}/likes
    pub async fn post_likes(&self, post_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self
            .inner
            .url(&format!("/api/repo-social/posts/{post_id}/likes"))?;
        let builder = self.inner.request(Method::GET, url, None);
        self.inner.execute(builder, "list post likes").await
    }
}
