//! Command handlers

pub mod config;
pub mod inspect;
pub mod pull;
pub mod push;
pub mod status;

use std::path::Path;

use anyhow::{bail, Context, Result};

use archsync_core::{Config, SyncError, Workspace};

/// Read and validate a workspace JSON file
pub fn load_workspace(path: &Path) -> Result<Workspace> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workspace file: {:?}", path))?;
    Workspace::from_json(&json).with_context(|| format!("Invalid workspace file: {:?}", path))
}

/// Pick the workspace id from the command line or the configuration
pub fn resolve_workspace_id(config: &Config, cli_override: Option<String>) -> Result<String> {
    match cli_override.or_else(|| config.workspace_id.clone()) {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => bail!(
            "No workspace id configured. Pass --workspace-id or set it with:\n  \
             archsync config set workspace_id <id>"
        ),
    }
}

/// Fail early with a hint when credentials are missing
pub fn require_credentials(config: &Config) -> Result<()> {
    if config.credentials().is_none() {
        bail!(
            "API credentials not configured. Set them with:\n  \
             archsync config set api_key <key>\n  \
             archsync config set api_secret <secret>"
        );
    }
    Ok(())
}

/// Attach the recovery suggestion of a sync error, if it has one
pub fn sync_failure(err: SyncError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(hint) => anyhow::Error::new(err.clone()).context(format!("{}\n  {}", err, hint)),
        None => err.into(),
    }
}
