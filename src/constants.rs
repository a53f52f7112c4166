//! # Harness Constants
//!
//! Wire-level names shared by the API clients, bootstrappers and scenarios.

/// Header carrying the acting principal on every authenticated call
pub const USER_ID_HEADER: &str = "X-user-id";

/// Header carrying the search terms for `GET /search`
pub const SEARCH_TERMS_HEADER: &str = "X-Terms";

/// Default service endpoints as exposed by the local compose setup
pub mod endpoints {
    pub const POST_SERVICE: &str = "http://localhost:8081";
    pub const SOCIAL_SERVICE: &str = "http://localhost:8082";
    pub const SEARCH_SERVICE: &str = "http://localhost:8083";
    pub const USER_TIMELINE_SERVICE: &str = "http://localhost:8084";
    pub const HOME_TIMELINE_SERVICE: &str = "http://localhost:8085";
    pub const SEARCH_ENGINE: &str = "http://localhost:9200";
    pub const DOCUMENT_STORE: &str = "mongodb://localhost:27017";
}

/// Fixture users used by the end-to-end scenarios
pub mod fixtures {
    pub const USER_1: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa1";
    pub const USER_2: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa2";
    pub const USER_3: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa3";
}

/// Stress run defaults
pub mod stress {
    pub const TOTAL_POSTS: usize = 3000;
    pub const BATCH_SIZE: usize = 150;
    pub const INTER_BATCH_DELAY_MS: u64 = 1000;
    pub const PER_ITEM_TIMEOUT_MS: u64 = 10_000;
}

/// Search index provisioning
pub mod search_index {
    pub const INDEX_NAME: &str = "es_posts";
    /// Keyword-typed fields of the posts index
    pub const KEYWORD_FIELDS: &[&str] = &["id"];
    /// Full-text fields of the posts index
    pub const TEXT_FIELDS: &[&str] = &["raw_text", "words", "hashtags"];
}

/// Document store provisioning
pub mod document_store {
    pub const DATABASE: &str = "Epitweet";
    pub const ADMIN_USER: &str = "admin";
    pub const ADMIN_PASSWORD: &str = "admin";
    pub const ADMIN_ROLE: &str = "readWrite";
    pub const COLLECTIONS: &[&str] = &["Posts", "Users", "userTimelines", "HomeTimeline"];
}
