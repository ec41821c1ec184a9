//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use serde::Serialize;

use archsync_core::{ElementKind, UploadReceipt, Workspace};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Counts and view list of a workspace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceSummary {
    pub name: String,
    pub description: Option<String>,
    pub revision: u64,
    pub people: usize,
    pub software_systems: usize,
    pub containers: usize,
    pub components: usize,
    pub relationships: usize,
    pub views: Vec<ViewSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSummary {
    pub key: String,
    pub title: String,
    pub elements: usize,
    /// Relationships for static views, steps for dynamic views
    pub edges: usize,
}

impl WorkspaceSummary {
    pub fn new(workspace: &Workspace) -> Self {
        let model = workspace.model();
        let count = |kind: ElementKind| model.elements().iter().filter(|e| e.kind == kind).count();

        let static_views = workspace.views().static_views().iter().map(|v| ViewSummary {
            key: v.key.clone(),
            title: v.display_title(),
            elements: v.elements().len(),
            edges: v.relationships().len(),
        });
        let dynamic_views = workspace.views().dynamic_views().iter().map(|v| ViewSummary {
            key: v.key.clone(),
            title: v.display_title(),
            elements: v.elements().len(),
            edges: v.steps().len(),
        });

        Self {
            name: workspace.name.clone(),
            description: workspace.description.clone(),
            revision: workspace.revision,
            people: count(ElementKind::Person),
            software_systems: count(ElementKind::SoftwareSystem),
            containers: count(ElementKind::Container),
            components: count(ElementKind::Component),
            relationships: model.relationship_count(),
            views: static_views.chain(dynamic_views).collect(),
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a workspace summary
    pub fn print_summary(&self, summary: &WorkspaceSummary) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Workspace:   {}", summary.name);
                if let Some(ref desc) = summary.description {
                    println!("Description: {}", truncate(desc, 70));
                }
                println!("Revision:    {}", summary.revision);
                println!();
                println!("Model:");
                println!("  People:           {}", summary.people);
                println!("  Software systems: {}", summary.software_systems);
                println!("  Containers:       {}", summary.containers);
                println!("  Components:       {}", summary.components);
                println!("  Relationships:    {}", summary.relationships);
                println!();
                if summary.views.is_empty() {
                    println!("No views defined.");
                    return Ok(());
                }
                println!("Views:");
                for view in &summary.views {
                    println!(
                        "  {} | {} element(s), {} edge(s)",
                        truncate(&view.title, 50),
                        view.elements,
                        view.edges
                    );
                }
                println!("\n{} view(s)", summary.views.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(summary)?);
            }
            OutputFormat::Quiet => {
                for view in &summary.views {
                    println!("{}", view.key);
                }
            }
        }
        Ok(())
    }

    /// Print the result of an upload
    pub fn print_receipt(&self, receipt: &UploadReceipt) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Uploaded workspace {} (revision {})",
                    receipt.workspace_id, receipt.revision
                );
                match &receipt.merge {
                    Some(report) => println!(
                        "  Merged layout from remote: {} view(s), {} element position(s), {} route(s)",
                        report.views_matched,
                        report.elements_positioned,
                        report.relationships_routed
                    ),
                    None if receipt.base_revision.is_none() => {
                        println!("  Created new remote workspace")
                    }
                    None => println!("  Remote layout not merged"),
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(receipt)?);
            }
            OutputFormat::Quiet => {
                println!("{}", receipt.revision);
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
