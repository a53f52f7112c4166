//! # Timeline API Client
//!
//! The user timeline and home timeline live in two separate services; this
//! client holds one connection to each.

use reqwest::Method;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::common::{ApiResponse, ServiceClient};
use crate::config::AuthConfig;
use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone)]
pub struct TimelineApiClient {
    user_timeline: ServiceClient,
    home_timeline: ServiceClient,
}

impl TimelineApiClient {
    pub fn new(
        user_timeline_url: &str,
        home_timeline_url: &str,
        timeout: Duration,
        auth: &AuthConfig,
    ) -> HarnessResult<Self> {
        Ok(Self {
            user_timeline: ServiceClient::new("user-timeline", user_timeline_url, timeout, auth)?,
            home_timeline: ServiceClient::new("home-timeline", home_timeline_url, timeout, auth)?,
        })
    }

    /// GET /api/users/timeline?userIds=...
    ///
    /// One `userIds` pair per requested user.
    pub async fn user_timeline(&self, user_ids: &[Uuid]) -> HarnessResult<ApiResponse> {
        if user_ids.is_empty() {
            return Err(HarnessError::InvalidInput(
                "user timeline requires at least one user id".to_string(),
            ));
        }

        let mut url = self.user_timeline.url("/api/users/timeline")?;
        {
            let mut query_pairs = url.query_pairs_mut();
            for user_id in user_ids {
                query_pairs.append_pair("userIds", &user_id.to_string());
            }
        }

        debug!(url = %url, users = user_ids.len(), "Fetching user timeline");
        let builder = self.user_timeline.request(Method::GET, url, None);
        self.user_timeline.execute(builder, "get user timeline").await
    }

    /// GET /api/users/{user_id}/home-timeline
    pub async fn home_timeline(&self, user_id: Uuid) -> HarnessResult<ApiResponse> {
        let url = self
            .home_timeline
            .url(&format!("/api/users/{user_id}/home-timeline"))?;

        debug!(url = %url, "Fetching home timeline");
        let builder = self.home_timeline.request(Method::GET, url, None);
        self.home_timeline.execute(builder, "get home timeline").await
    }
}
