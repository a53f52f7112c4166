//! Posts index provisioning over the search engine's REST API.

use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::BootstrapStatus;
use crate::config::BootstrapConfig;
use crate::constants::search_index::{KEYWORD_FIELDS, TEXT_FIELDS};
use crate::error::{HarnessError, HarnessResult};
use crate::logging::log_bootstrap_operation;

/// Creates the posts index with its mapping unless it already exists
#[derive(Debug, Clone)]
pub struct SearchIndexBootstrap {
    client: Client,
    base_url: Url,
    index_name: String,
}

impl SearchIndexBootstrap {
    pub fn new(base_url: &str, index_name: &str, timeout: Duration) -> HarnessResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            HarnessError::config_error(format!("Invalid search engine URL '{base_url}': {e}"))
        })?;
        if index_name.is_empty() || index_name.contains('/') {
            return Err(HarnessError::config_error(format!(
                "Invalid index name '{index_name}'"
            )));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            HarnessError::config_error(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            index_name: index_name.to_string(),
        })
    }

    pub fn from_config(config: &BootstrapConfig, timeout: Duration) -> HarnessResult<Self> {
        Self::new(&config.search_engine_url, &config.index_name, timeout)
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Index body: `id` as keyword, the analysed post fields as text
    pub fn mapping() -> Value {
        let mut properties = Map::new();
        for field in KEYWORD_FIELDS {
            properties.insert((*field).to_string(), json!({ "type": "keyword" }));
        }
        for field in TEXT_FIELDS {
            properties.insert((*field).to_string(), json!({ "type": "text" }));
        }

        json!({ "mappings": { "properties": properties } })
    }

    fn index_url(&self) -> HarnessResult<Url> {
        self.base_url
            .join(&format!("/{}", self.index_name))
            .map_err(|e| HarnessError::config_error(format!("Failed to construct URL: {e}")))
    }

    /// HEAD /{index}
    pub async fn index_exists(&self) -> HarnessResult<bool> {
        let url = self.index_url()?;
        debug!(url = %url, "Checking whether index exists");

        let response = self.client.head(url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(HarnessError::Bootstrap(format!(
                "Unexpected status {status} checking index '{}'",
                self.index_name
            ))),
        }
    }

    /// Create the index if absent; a no-op when it exists
    pub async fn ensure_index(&self) -> HarnessResult<BootstrapStatus> {
        if self.index_exists().await? {
            info!(index = %self.index_name, "Index already exists");
            log_bootstrap_operation("search-engine", &self.index_name, "already_exists", None);
            return Ok(BootstrapStatus::AlreadyExists);
        }

        let url = self.index_url()?;
        let response = self.client.put(url).json(&Self::mapping()).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            info!(index = %self.index_name, "Index created successfully");
            log_bootstrap_operation("search-engine", &self.index_name, "created", None);
            return Ok(BootstrapStatus::Created);
        }

        // Another provisioner won the race between HEAD and PUT
        if status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception")
        {
            log_bootstrap_operation(
                "search-engine",
                &self.index_name,
                "already_exists",
                Some("created concurrently"),
            );
            return Ok(BootstrapStatus::AlreadyExists);
        }

        Err(HarnessError::Bootstrap(format!(
            "Failed to create index '{}': HTTP {status} - {body}",
            self.index_name
        )))
    }
}
