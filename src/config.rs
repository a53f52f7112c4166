//! # Harness Configuration
//!
//! Configuration for the service endpoints, credentials, fixture users, stress
//! run parameters and provisioning targets. Supports config files, environment
//! variables and command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::constants::{document_store, endpoints, fixtures, search_index, stress};
use crate::error::{HarnessError, HarnessResult};

/// Top-level harness configuration
///
/// # Examples
///
/// ```rust
/// use social_harness::config::HarnessConfig;
///
/// let config = HarnessConfig::default();
/// assert_eq!(config.services.post_url, "http://localhost:8081");
/// assert_eq!(config.stress.batch_size, 150);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URLs of the services under test
    pub services: ServiceEndpoints,
    /// Credentials attached to every authenticated call
    pub auth: AuthConfig,
    /// Fixture users acting in the scenarios
    pub fixtures: UserFixtures,
    /// Batched post-creation run parameters
    pub stress: StressConfig,
    /// Search index and document store provisioning targets
    pub bootstrap: BootstrapConfig,
}

/// Base URLs of the external services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    pub post_url: String,
    pub social_url: String,
    pub search_url: String,
    pub user_timeline_url: String,
    pub home_timeline_url: String,
    /// Whole-request timeout for non-stress calls, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            post_url: endpoints::POST_SERVICE.to_string(),
            social_url: endpoints::SOCIAL_SERVICE.to_string(),
            search_url: endpoints::SEARCH_SERVICE.to_string(),
            user_timeline_url: endpoints::USER_TIMELINE_SERVICE.to_string(),
            home_timeline_url: endpoints::HOME_TIMELINE_SERVICE.to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ServiceEndpoints {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Bearer token issued out of band
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// The three fixture users of the end-to-end flows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFixtures {
    pub user1: Uuid,
    pub user2: Uuid,
    pub user3: Uuid,
}

impl Default for UserFixtures {
    fn default() -> Self {
        Self {
            user1: Uuid::parse_str(fixtures::USER_1).unwrap_or_default(),
            user2: Uuid::parse_str(fixtures::USER_2).unwrap_or_default(),
            user3: Uuid::parse_str(fixtures::USER_3).unwrap_or_default(),
        }
    }
}

/// Parameters of the batched post-creation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub total_posts: usize,
    pub batch_size: usize,
    pub inter_batch_delay_ms: u64,
    pub per_item_timeout_ms: u64,
    /// Successes required for a passing verdict (defaults to `total_posts`)
    pub min_successes: Option<usize>,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            total_posts: stress::TOTAL_POSTS,
            batch_size: stress::BATCH_SIZE,
            inter_batch_delay_ms: stress::INTER_BATCH_DELAY_MS,
            per_item_timeout_ms: stress::PER_ITEM_TIMEOUT_MS,
            min_successes: None,
        }
    }
}

impl StressConfig {
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn per_item_timeout(&self) -> Duration {
        Duration::from_millis(self.per_item_timeout_ms)
    }

    /// Acceptance threshold for the run
    pub fn required_successes(&self) -> usize {
        self.min_successes.unwrap_or(self.total_posts)
    }
}

/// Provisioning targets
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub search_engine_url: String,
    pub index_name: String,
    pub document_store_uri: String,
    pub database: String,
    pub admin_user: String,
    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            search_engine_url: endpoints::SEARCH_ENGINE.to_string(),
            index_name: search_index::INDEX_NAME.to_string(),
            document_store_uri: endpoints::DOCUMENT_STORE.to_string(),
            database: document_store::DATABASE.to_string(),
            admin_user: document_store::ADMIN_USER.to_string(),
            admin_password: document_store::ADMIN_PASSWORD.to_string(),
        }
    }
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("search_engine_url", &self.search_engine_url)
            .field("index_name", &self.index_name)
            .field("document_store_uri", &self.document_store_uri)
            .field("database", &self.database)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"[REDACTED]")
            .finish()
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables and config file
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (first of `./social-harness.toml`,
    ///    `./config/social-harness.toml`, `~/.social-harness/config.toml`)
    /// 3. Default values
    pub fn load() -> HarnessResult<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                Self::load_from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        debug!("Loaded harness configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from a specific file, then apply environment overrides
    pub fn load_with_file(path: &Path) -> HarnessResult<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without overrides or validation
    pub fn load_from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| HarnessError::config_error(format!("Failed to parse config file: {}", e)))
    }

    fn find_config_file() -> Option<PathBuf> {
        let mut candidates = vec![
            PathBuf::from("./social-harness.toml"),
            PathBuf::from("./config/social-harness.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".social-harness").join("config.toml"));
        }

        candidates.into_iter().find(|path| path.is_file())
    }

    /// Apply `SOCIAL_HARNESS_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> HarnessResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Numeric values that do not parse are configuration errors.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> HarnessResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let services = &mut self.services;
        for (key, slot) in [
            ("SOCIAL_HARNESS_POST_URL", &mut services.post_url),
            ("SOCIAL_HARNESS_SOCIAL_URL", &mut services.social_url),
            ("SOCIAL_HARNESS_SEARCH_URL", &mut services.search_url),
            (
                "SOCIAL_HARNESS_USER_TIMELINE_URL",
                &mut services.user_timeline_url,
            ),
            (
                "SOCIAL_HARNESS_HOME_TIMELINE_URL",
                &mut services.home_timeline_url,
            ),
            (
                "SOCIAL_HARNESS_SEARCH_ENGINE_URL",
                &mut self.bootstrap.search_engine_url,
            ),
            (
                "SOCIAL_HARNESS_DOCUMENT_STORE_URI",
                &mut self.bootstrap.document_store_uri,
            ),
            ("SOCIAL_HARNESS_DATABASE", &mut self.bootstrap.database),
        ] {
            if let Some(value) = lookup(key) {
                *slot = value;
            }
        }

        if let Some(token) = lookup("SOCIAL_HARNESS_TOKEN") {
            self.auth.bearer_token = Some(token);
        }
        if let Some(total) = lookup("SOCIAL_HARNESS_TOTAL_POSTS") {
            self.stress.total_posts = parse_count("SOCIAL_HARNESS_TOTAL_POSTS", &total)?;
        }
        if let Some(size) = lookup("SOCIAL_HARNESS_BATCH_SIZE") {
            self.stress.batch_size = parse_count("SOCIAL_HARNESS_BATCH_SIZE", &size)?;
        }
        Ok(())
    }

    /// Reject values the harness cannot run with
    pub fn validate(&self) -> HarnessResult<()> {
        if self.stress.total_posts == 0 {
            return Err(HarnessError::config_error(
                "stress.total_posts must be greater than zero",
            ));
        }
        if self.stress.batch_size == 0 {
            return Err(HarnessError::config_error(
                "stress.batch_size must be greater than zero",
            ));
        }
        if self.stress.per_item_timeout_ms == 0 {
            return Err(HarnessError::config_error(
                "stress.per_item_timeout_ms must be greater than zero",
            ));
        }
        if self.services.request_timeout_ms == 0 {
            return Err(HarnessError::config_error(
                "services.request_timeout_ms must be greater than zero",
            ));
        }

        for (name, url) in [
            ("services.post_url", &self.services.post_url),
            ("services.social_url", &self.services.social_url),
            ("services.search_url", &self.services.search_url),
            ("services.user_timeline_url", &self.services.user_timeline_url),
            ("services.home_timeline_url", &self.services.home_timeline_url),
            ("bootstrap.search_engine_url", &self.bootstrap.search_engine_url),
        ] {
            reqwest::Url::parse(url).map_err(|e| {
                HarnessError::config_error(format!("{name} is not a valid URL ({url}): {e}"))
            })?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HarnessError::config_error(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            HarnessError::config_error(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content).map_err(|e| {
            HarnessError::config_error(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> HarnessResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| HarnessError::config_error("Could not determine home directory"))?;

        Ok(home_dir.join(".social-harness").join("config.toml"))
    }
}

fn parse_count(key: &str, value: &str) -> HarnessResult<usize> {
    value.trim().parse().map_err(|e| {
        HarnessError::config_error(format!("{key} must be a whole number, got '{value}': {e}"))
    })
}
