//! Inspect command handler

use std::path::Path;

use anyhow::Result;

use super::load_workspace;
use crate::output::{Output, WorkspaceSummary};

/// Summarize a workspace file
pub fn inspect(file: &Path, output: &Output) -> Result<()> {
    let workspace = load_workspace(file)?;
    output.print_summary(&WorkspaceSummary::new(&workspace))
}
