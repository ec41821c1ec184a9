//! Config command handlers

use std::path::Path;

use anyhow::{Context, Result};

use archsync_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: &Path, output: &Output) -> Result<()> {
    let config = Config::load_from_path(config_path).context("Failed to load configuration")?;
    let secret = config.masked_secret();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "api_key": config.api_key,
                    "api_secret": secret,
                    "workspace_id": config.workspace_id,
                    "merge_from_remote": config.merge_from_remote,
                    "timeout_secs": config.timeout_secs,
                    "log_level": config.log_level
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config_path.display());
        }
        OutputFormat::Human => {
            let unset = "(not set)";
            println!("Configuration:");
            println!("  api_url:           {}", config.api_url);
            println!(
                "  api_key:           {}",
                config.api_key.as_deref().unwrap_or(unset)
            );
            println!(
                "  api_secret:        {}",
                secret.as_deref().unwrap_or(unset)
            );
            println!(
                "  workspace_id:      {}",
                config.workspace_id.as_deref().unwrap_or(unset)
            );
            println!("  merge_from_remote: {}", config.merge_from_remote);
            println!("  timeout_secs:      {}", config.timeout_secs);
            println!("  log_level:         {}", config.log_level);
            println!();
            println!("Config file: {}", config_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, config_path: &Path, output: &Output) -> Result<()> {
    let mut config = Config::load_from_path(config_path).context("Failed to load configuration")?;
    config.set(&key, &value)?;
    config
        .save_to_path(config_path)
        .context("Failed to save configuration")?;

    let shown = if key == "api_secret" {
        config.masked_secret().unwrap_or_default()
    } else {
        value
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}
