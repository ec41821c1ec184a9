//! Push command handler

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use archsync_core::{Config, SyncClient};

use super::{load_workspace, require_credentials, resolve_workspace_id, sync_failure};
use crate::output::Output;

/// Upload a workspace file to the remote store
pub async fn push(
    config: &Config,
    file: &Path,
    workspace_id: Option<String>,
    no_merge: bool,
    output: &Output,
) -> Result<()> {
    let workspace = load_workspace(file)?;
    let workspace_id = resolve_workspace_id(config, workspace_id)?;
    require_credentials(config)?;
    debug!(file = %file.display(), workspace_id = %workspace_id, no_merge, "Pushing workspace");

    let mut client =
        SyncClient::from_config(config).context("Failed to create sync client")?;
    if no_merge {
        client.set_merge_from_remote(false);
    }

    output.message(&format!(
        "Uploading '{}' to workspace {} at {}...",
        workspace.name, workspace_id, config.api_url
    ));

    let receipt = client
        .upload(&workspace_id, &workspace)
        .await
        .map_err(sync_failure)?;
    output.print_receipt(&receipt)
}
