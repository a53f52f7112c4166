//! CLI module for the social harness
//!
//! Command handlers, one file per command category. Each handler returns
//! whether the command's verdict was a pass.

pub mod commands;

pub use commands::{
    handle_bootstrap_command, handle_config_command, handle_config_init, handle_stress_command,
    handle_user_flow_command,
};
