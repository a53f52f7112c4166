//! API Client Modules
//!
//! HTTP clients for the services under test: post storage, the social graph,
//! the user and home timelines, and search. Every client returns an
//! [`ApiResponse`] carrying the raw status so scenarios can assert on exact
//! codes; typed helpers check the expected status and decode the body.

pub mod common;
pub mod post_client;
pub mod search_client;
pub mod social_client;
pub mod timeline_client;

pub use common::{ApiResponse, ServiceClient};
pub use post_client::PostApiClient;
pub use search_client::SearchApiClient;
pub use social_client::SocialApiClient;
pub use timeline_client::TimelineApiClient;

use crate::config::HarnessConfig;
use crate::error::HarnessResult;

/// One client per external service, built from the same configuration
#[derive(Debug, Clone)]
pub struct ServiceClients {
    pub posts: PostApiClient,
    pub social: SocialApiClient,
    pub timelines: TimelineApiClient,
    pub search: SearchApiClient,
}

impl ServiceClients {
    pub fn from_config(config: &HarnessConfig) -> HarnessResult<Self> {
        let services = &config.services;
        let timeout = services.request_timeout();
        let auth = &config.auth;

        Ok(Self {
            posts: PostApiClient::new(&services.post_url, timeout, auth)?,
            social: SocialApiClient::new(&services.social_url, timeout, auth)?,
            timelines: TimelineApiClient::new(
                &services.user_timeline_url,
                &services.home_timeline_url,
                timeout,
                auth,
            )?,
            search: SearchApiClient::new(&services.search_url, timeout, auth)?,
        })
    }
}
