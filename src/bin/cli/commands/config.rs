//! Configuration command handlers

use anyhow::{bail, Context, Result};
use social_harness::config::HarnessConfig;
use std::path::PathBuf;

use crate::ConfigCommands;

const REDACTED: &str = "***";

pub fn handle_config_command(cmd: ConfigCommands, config: &HarnessConfig) -> Result<bool> {
    match cmd {
        ConfigCommands::Show => {
            let mut shown = config.clone();
            if shown.auth.bearer_token.is_some() {
                shown.auth.bearer_token = Some(REDACTED.to_string());
            }
            shown.bootstrap.admin_password = REDACTED.to_string();

            println!("Current configuration:");
            println!();
            println!(
                "{}",
                toml::to_string_pretty(&shown).context("serializing configuration")?
            );
            Ok(true)
        }
        ConfigCommands::Init { path, force } => handle_config_init(path, force),
    }
}

/// Write a default configuration file
///
/// Never reads the existing configuration, so a broken file can be replaced.
pub fn handle_config_init(path: Option<String>, force: bool) -> Result<bool> {
    let target = match path {
        Some(path) => PathBuf::from(path),
        None => HarnessConfig::default_config_path()?,
    };

    if target.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }

    HarnessConfig::default().save_to_file(&target)?;
    println!("✓ Wrote default configuration to {}", target.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_replaces_invalid_file_with_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("social-harness.toml");
        std::fs::write(&path, "[stress]\nbatch_size = \"many\"\n").unwrap();
        assert!(HarnessConfig::load_with_file(&path).is_err());

        let target = path.to_string_lossy().to_string();
        assert!(handle_config_init(Some(target.clone()), false).is_err());
        assert!(handle_config_init(Some(target), true).unwrap());

        let written = HarnessConfig::load_from_file(&path).unwrap();
        assert_eq!(written.stress.batch_size, 150);
    }
}
