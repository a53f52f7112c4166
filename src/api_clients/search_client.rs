//! # Search API Client

use reqwest::Method;
use std::time::Duration;
use tracing::debug;

use super::common::{ApiResponse, ServiceClient};
use crate::config::AuthConfig;
use crate::constants::SEARCH_TERMS_HEADER;
use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone)]
pub struct SearchApiClient {
    inner: ServiceClient,
}

impl SearchApiClient {
    pub fn new(base_url: &str, timeout: Duration, auth: &AuthConfig) -> HarnessResult<Self> {
        Ok(Self {
            inner: ServiceClient::new("search", base_url, timeout, auth)?,
        })
    }

    /// GET /search with the terms in the `X-Terms` header
    ///
    /// Blank terms are rejected before any request is made; the service
    /// would answer `400`.
    pub async fn search(&self, terms: &str) -> HarnessResult<ApiResponse> {
        if terms.trim().is_empty() {
            return Err(HarnessError::InvalidInput(
                "search terms must not be empty".to_string(),
            ));
        }

        let url = self.inner.url("/search")?;
        debug!(url = %url, terms = %terms, "Searching posts");

        let builder = self
            .inner
            .request(Method::GET, url, None)
            .header(SEARCH_TERMS_HEADER, terms);
        self.inner.execute(builder, "search posts").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_terms_rejected() {
        let client = SearchApiClient::new(
            "http://localhost:8083",
            Duration::from_secs(1),
            &AuthConfig::default(),
        )
        .unwrap();

        assert!(matches!(
            client.search("   ").await,
            Err(HarnessError::InvalidInput(_))
        ));
    }
}
