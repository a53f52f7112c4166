//! Document store provisioning: an administrative credential scoped to the
//! application database, plus the collections the services write to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::BootstrapStatus;
use crate::config::BootstrapConfig;
use crate::constants::document_store::{ADMIN_ROLE, COLLECTIONS};
use crate::error::HarnessResult;
use crate::logging::log_bootstrap_operation;

/// Administrative operations the bootstrapper needs from a document store
#[async_trait]
pub trait DocumentStoreAdmin: Send + Sync {
    async fn user_exists(&self, database: &str, user: &str) -> HarnessResult<bool>;

    async fn create_user(
        &self,
        database: &str,
        user: &str,
        password: &str,
        role: &str,
    ) -> HarnessResult<()>;

    async fn collection_names(&self, database: &str) -> HarnessResult<Vec<String>>;

    async fn create_collection(&self, database: &str, name: &str) -> HarnessResult<()>;
}

/// What a bootstrap pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStoreReport {
    pub database: String,
    pub user: BootstrapStatus,
    pub created_collections: Vec<String>,
    pub existing_collections: Vec<String>,
}

impl DocumentStoreReport {
    /// True when the target was already fully provisioned
    pub fn is_noop(&self) -> bool {
        self.user == BootstrapStatus::AlreadyExists && self.created_collections.is_empty()
    }
}

/// Idempotent provisioning of credential and collections
#[derive(Debug)]
pub struct DocumentStoreBootstrap<A> {
    admin: A,
    database: String,
    user: String,
    password: String,
    collections: Vec<String>,
}

impl<A: DocumentStoreAdmin> DocumentStoreBootstrap<A> {
    pub fn new(admin: A, config: &BootstrapConfig) -> Self {
        Self {
            admin,
            database: config.database.clone(),
            user: config.admin_user.clone(),
            password: config.admin_password.clone(),
            collections: COLLECTIONS.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub async fn ensure(&self) -> HarnessResult<DocumentStoreReport> {
        let user = if self.admin.user_exists(&self.database, &self.user).await? {
            log_bootstrap_operation("document-store", &self.user, "already_exists", None);
            BootstrapStatus::AlreadyExists
        } else {
            self.admin
                .create_user(&self.database, &self.user, &self.password, ADMIN_ROLE)
                .await?;
            log_bootstrap_operation("document-store", &self.user, "created", Some(ADMIN_ROLE));
            BootstrapStatus::Created
        };

        let present = self.admin.collection_names(&self.database).await?;
        let mut created_collections = Vec::new();
        let mut existing_collections = Vec::new();

        for name in &self.collections {
            if present.iter().any(|existing| existing == name) {
                existing_collections.push(name.clone());
                continue;
            }
            self.admin.create_collection(&self.database, name).await?;
            log_bootstrap_operation("document-store", name, "created", Some(&self.database));
            created_collections.push(name.clone());
        }

        info!(
            database = %self.database,
            user = %user,
            created = created_collections.len(),
            existing = existing_collections.len(),
            "Document store bootstrap finished"
        );

        Ok(DocumentStoreReport {
            database: self.database.clone(),
            user,
            created_collections,
            existing_collections,
        })
    }
}

#[cfg(feature = "document-store")]
pub use mongo::MongoAdmin;

#[cfg(feature = "document-store")]
mod mongo {
    use async_trait::async_trait;
    use mongodb::bson::doc;
    use mongodb::Client;
    use tracing::debug;

    use super::DocumentStoreAdmin;
    use crate::error::{HarnessError, HarnessResult};

    /// [`DocumentStoreAdmin`] backed by a MongoDB deployment
    #[derive(Debug, Clone)]
    pub struct MongoAdmin {
        client: Client,
    }

    impl MongoAdmin {
        pub async fn connect(uri: &str) -> HarnessResult<Self> {
            let client = Client::with_uri_str(uri)
                .await
                .map_err(|e| HarnessError::DocumentStore(format!("Failed to connect: {e}")))?;
            debug!("Connected to document store");
            Ok(Self { client })
        }
    }

    fn store_error(operation: &str, e: mongodb::error::Error) -> HarnessError {
        HarnessError::DocumentStore(format!("{operation} failed: {e}"))
    }

    #[async_trait]
    impl DocumentStoreAdmin for MongoAdmin {
        async fn user_exists(&self, database: &str, user: &str) -> HarnessResult<bool> {
            let reply = self
                .client
                .database(database)
                .run_command(doc! { "usersInfo": user })
                .await
                .map_err(|e| store_error("usersInfo", e))?;

            Ok(reply
                .get_array("users")
                .map(|users| !users.is_empty())
                .unwrap_or(false))
        }

        async fn create_user(
            &self,
            database: &str,
            user: &str,
            password: &str,
            role: &str,
        ) -> HarnessResult<()> {
            self.client
                .database(database)
                .run_command(doc! {
                    "createUser": user,
                    "pwd": password,
                    "roles": [{ "role": role, "db": database }],
                })
                .await
                .map_err(|e| store_error("createUser", e))?;
            Ok(())
        }

        async fn collection_names(&self, database: &str) -> HarnessResult<Vec<String>> {
            self.client
                .database(database)
                .list_collection_names()
                .await
                .map_err(|e| store_error("listCollections", e))
        }

        async fn create_collection(&self, database: &str, name: &str) -> HarnessResult<()> {
            self.client
                .database(database)
                .create_collection(name)
                .await
                .map_err(|e| store_error("createCollection", e))
        }
    }
}
