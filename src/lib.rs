#![allow(clippy::doc_markdown)] // Allow technical terms like MongoDB, Elasticsearch in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Social Harness
//!
//! End-to-end test harness and provisioning tool for the social timeline
//! backend.
//!
//! ## Overview
//!
//! The backend is a set of independent HTTP services: post storage, the
//! social graph, user and home timelines, and search. This crate drives them
//! from the outside. It never reimplements them.
//!
//! ## Module Organization
//!
//! - [`batch`] - Bounded-concurrency batch request driver with outcome accounting
//! - [`api_clients`] - Typed HTTP clients for each service
//! - [`bootstrap`] - Idempotent search index and document store provisioning
//! - [`scenarios`] - Scripted end-to-end flows (user flow, stress flow)
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Console and JSON file logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use social_harness::api_clients::ServiceClients;
//! use social_harness::config::HarnessConfig;
//! use social_harness::scenarios::run_stress_flow;
//!
//! # async fn example() -> social_harness::HarnessResult<()> {
//! let config = HarnessConfig::load()?;
//! let clients = ServiceClients::from_config(&config)?;
//!
//! let stress = run_stress_flow(&clients, &config.fixtures, &config.stress).await?;
//! println!("{}", stress.report);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and in-process mock service tests
//! ```

pub mod api_clients;
pub mod batch;
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod scenarios;

pub use batch::{AttemptResult, BatchPlan, BatchRequestDriver, BatchSettings, RunOutcome};
pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
