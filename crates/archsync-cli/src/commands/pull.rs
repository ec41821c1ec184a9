//! Pull command handler

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use archsync_core::{Config, SyncClient};

use super::{require_credentials, resolve_workspace_id, sync_failure};
use crate::output::Output;

/// Fetch the remote workspace and write it to a file or stdout
pub async fn pull(
    config: &Config,
    workspace_id: Option<String>,
    output_path: Option<&Path>,
    output: &Output,
) -> Result<()> {
    let workspace_id = resolve_workspace_id(config, workspace_id)?;
    require_credentials(config)?;
    debug!(workspace_id = %workspace_id, "Pulling workspace");

    let client = SyncClient::from_config(config).context("Failed to create sync client")?;
    let Some(workspace) = client.fetch(&workspace_id).await.map_err(sync_failure)? else {
        bail!("Workspace {} does not exist on {}", workspace_id, config.api_url);
    };

    let json = workspace
        .to_json_pretty()
        .context("Failed to serialize workspace")?;

    match output_path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write workspace file: {:?}", path))?;
            output.success(&format!(
                "Saved workspace {} (revision {}) to {}",
                workspace_id,
                workspace.revision,
                path.display()
            ));
        }
        // The document itself is the output
        None => println!("{}", json),
    }

    Ok(())
}
