//! Provisioning command handlers

use anyhow::Result;
use social_harness::bootstrap::SearchIndexBootstrap;
use social_harness::config::HarnessConfig;
use social_harness::logging::log_error;
use social_harness::HarnessError;

use crate::{BootstrapCommands, OutputFormat};

pub async fn handle_bootstrap_command(
    cmd: BootstrapCommands,
    config: &HarnessConfig,
    format: OutputFormat,
) -> Result<bool> {
    match cmd {
        BootstrapCommands::SearchIndex => {
            let bootstrap =
                SearchIndexBootstrap::from_config(&config.bootstrap, config.services.request_timeout())?;

            if format == OutputFormat::Text {
                println!(
                    "Ensuring index '{}' at {}...",
                    bootstrap.index_name(),
                    config.bootstrap.search_engine_url
                );
            }

            match bootstrap.ensure_index().await {
                Ok(status) => {
                    match format {
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::json!({ "index": bootstrap.index_name(), "status": status })
                        ),
                        OutputFormat::Text => {
                            println!("✓ Index '{}' {status}", bootstrap.index_name())
                        }
                    }
                    Ok(true)
                }
                Err(e) => {
                    report_failure("search-index", "ensure index", &e);
                    Ok(false)
                }
            }
        }
        BootstrapCommands::DocumentStore => ensure_document_store(config, format).await,
    }
}

/// Log a provisioning failure and tell the operator whether a re-run may help
fn report_failure(component: &str, operation: &str, error: &HarnessError) {
    let hint = error
        .is_recoverable()
        .then_some("transient, safe to re-run");
    log_error(component, operation, &error.to_string(), hint);

    eprintln!("✗ {component}: {operation} failed: {error}");
    if let Some(hint) = hint {
        eprintln!("  ({hint})");
    }
}

#[cfg(feature = "document-store")]
async fn ensure_document_store(config: &HarnessConfig, format: OutputFormat) -> Result<bool> {
    use social_harness::bootstrap::{DocumentStoreBootstrap, MongoAdmin};

    if format == OutputFormat::Text {
        println!(
            "Ensuring database '{}' at {}...",
            config.bootstrap.database, config.bootstrap.document_store_uri
        );
    }

    let admin = match MongoAdmin::connect(&config.bootstrap.document_store_uri).await {
        Ok(admin) => admin,
        Err(e) => {
            report_failure("document-store", "connect", &e);
            return Ok(false);
        }
    };

    match DocumentStoreBootstrap::new(admin, &config.bootstrap).ensure().await {
        Ok(report) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => {
                    println!("✓ User '{}' {}", config.bootstrap.admin_user, report.user);
                    for name in &report.created_collections {
                        println!("  ✓ Collection '{name}' created");
                    }
                    for name in &report.existing_collections {
                        println!("  - Collection '{name}' already exists");
                    }
                }
            }
            Ok(true)
        }
        Err(e) => {
            report_failure("document-store", "ensure credential and collections", &e);
            Ok(false)
        }
    }
}

#[cfg(not(feature = "document-store"))]
async fn ensure_document_store(_config: &HarnessConfig, _format: OutputFormat) -> Result<bool> {
    eprintln!("✗ Built without the 'document-store' feature");
    Ok(false)
}
