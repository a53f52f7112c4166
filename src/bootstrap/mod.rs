//! # Provisioning
//!
//! One-shot, idempotent setup of the stores the services depend on: the
//! search engine's posts index and the document store's credential and
//! collections. Running either bootstrapper against an already provisioned
//! target performs no mutation.

pub mod document_store;
pub mod search_index;

pub use document_store::{DocumentStoreAdmin, DocumentStoreBootstrap, DocumentStoreReport};
#[cfg(feature = "document-store")]
pub use document_store::MongoAdmin;
pub use search_index::SearchIndexBootstrap;

use serde::{Deserialize, Serialize};

/// Result of ensuring a single resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapStatus {
    Created,
    AlreadyExists,
}

impl std::fmt::Display for BootstrapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapStatus::Created => write!(f, "created"),
            BootstrapStatus::AlreadyExists => write!(f, "already exists"),
        }
    }
}
