//! Command handlers for the social harness CLI

pub mod bootstrap;
pub mod config;
pub mod scenario;

pub use bootstrap::handle_bootstrap_command;
pub use config::{handle_config_command, handle_config_init};
pub use scenario::{handle_stress_command, handle_user_flow_command};
