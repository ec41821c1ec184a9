//! Status command handler

use std::path::Path;

use anyhow::Result;

use archsync_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the effective configuration and whether pushing is possible
pub fn show(config: &Config, config_path: &Path, output: &Output) -> Result<()> {
    let has_credentials = config.credentials().is_some();
    let ready = has_credentials && config.workspace_id.is_some();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": config_path,
                    "config_file_exists": config_path.exists(),
                    "api_url": config.api_url,
                    "workspace_id": config.workspace_id,
                    "credentials": has_credentials,
                    "merge_from_remote": config.merge_from_remote,
                    "ready": ready
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if ready { "ready" } else { "not-ready" });
        }
        OutputFormat::Human => {
            println!("archsync Status");
            println!("===============");
            println!();
            println!("Config file: {}", config_path.display());
            if !config_path.exists() {
                println!("  (not found, using defaults and environment)");
            }
            println!();
            println!("Remote:");
            println!("  API URL:      {}", config.api_url);
            println!(
                "  Workspace:    {}",
                config.workspace_id.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  Credentials:  {}",
                if has_credentials { "configured" } else { "missing" }
            );
            println!("  Merge layout: {}", config.merge_from_remote);
            println!();
            if ready {
                println!("Ready to push.");
            } else {
                println!("Not ready: set workspace_id, api_key and api_secret first.");
            }
        }
    }

    Ok(())
}
