//! # Social Harness CLI
//!
//! Command-line interface for running the end-to-end flows against the social
//! backend and provisioning its search index and document store.

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use social_harness::logging::{console_level_for_verbosity, init_structured_logging};
use social_harness::HarnessConfig;
use std::process::ExitCode;
use tracing::info;

use cli::{
    handle_bootstrap_command, handle_config_command, handle_config_init, handle_stress_command,
    handle_user_flow_command,
};

#[derive(Parser, Debug)]
#[command(name = "social-harness")]
#[command(about = "End-to-end test harness and provisioning for the social backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (default: ./social-harness.toml or ~/.social-harness/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create many posts in paced batches, then check follow and timelines
    Stress {
        /// Number of posts to create
        #[arg(long)]
        total: Option<usize>,
        /// Posts issued concurrently per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Pause between batches in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Per-post timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Successful posts required for a passing verdict (default: all)
        #[arg(long)]
        min_successes: Option<usize>,
    },

    /// Run the post, follow, block, search and timeline flow
    UserFlow,

    /// Provision backing stores
    #[command(subcommand)]
    Bootstrap(BootstrapCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum BootstrapCommands {
    /// Ensure the posts search index exists with its mapping
    SearchIndex,
    /// Ensure the document store credential and collections exist
    DocumentStore,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (secrets redacted)
    Show,
    /// Write a configuration file with default values
    Init {
        /// Target path (default: ~/.social-harness/config.toml)
        #[arg(long)]
        path: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_structured_logging(Some(console_level_for_verbosity(cli.verbose)));

    let passed = match cli.command {
        // Must work even when the existing config file is invalid
        Commands::Config(ConfigCommands::Init { path, force }) => handle_config_init(path, force)?,
        command => {
            let config = load_config(cli.config.as_deref())?;
            info!(
                post_url = %config.services.post_url,
                social_url = %config.services.social_url,
                "Social harness starting"
            );
            dispatch(command, &config, cli.format).await?
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_config(path: Option<&str>) -> anyhow::Result<HarnessConfig> {
    Ok(match path {
        Some(path) => HarnessConfig::load_with_file(std::path::Path::new(path))
            .with_context(|| format!("loading configuration from {path}"))?,
        None => HarnessConfig::load().context("loading configuration")?,
    })
}

async fn dispatch(
    command: Commands,
    config: &HarnessConfig,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    match command {
        Commands::Stress {
            total,
            batch_size,
            delay_ms,
            timeout_ms,
            min_successes,
        } => {
            let mut stress = config.stress.clone();
            if let Some(total) = total {
                stress.total_posts = total;
            }
            if let Some(batch_size) = batch_size {
                stress.batch_size = batch_size;
            }
            if let Some(delay_ms) = delay_ms {
                stress.inter_batch_delay_ms = delay_ms;
            }
            if let Some(timeout_ms) = timeout_ms {
                stress.per_item_timeout_ms = timeout_ms;
            }
            if min_successes.is_some() {
                stress.min_successes = min_successes;
            }
            handle_stress_command(config, &stress, format).await
        }
        Commands::UserFlow => handle_user_flow_command(config, format).await,
        Commands::Bootstrap(cmd) => handle_bootstrap_command(cmd, config, format).await,
        Commands::Config(cmd) => handle_config_command(cmd, config),
    }
}
