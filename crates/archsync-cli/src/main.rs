//! archsync CLI
//!
//! Command-line interface for archsync - publish architecture workspaces
//! to a remote store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use archsync_core::Config;

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "archsync")]
#[command(about = "archsync - Architecture as code, published to a remote workspace")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a workspace file, merging layout from the remote copy
    Push {
        /// Workspace JSON file
        file: PathBuf,
        /// Overwrite the remote layout instead of merging it
        #[arg(long)]
        no_merge: bool,
        /// Remote workspace id (defaults to the configured one)
        #[arg(short, long)]
        workspace_id: Option<String>,
    },
    /// Download the remote workspace
    Pull {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Remote workspace id (defaults to the configured one)
        #[arg(short, long)]
        workspace_id: Option<String>,
    },
    /// Summarize a workspace file
    Inspect {
        /// Workspace JSON file
        file: PathBuf,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show the effective remote settings
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, api_key, api_secret, workspace_id,
        /// merge_from_remote, timeout_secs, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.unwrap_or_else(Config::config_file_path);

    let command = match cli.command {
        // Config commands work on the file directly
        Commands::Config { command } => {
            return match command {
                Some(ConfigCommands::Show) | None => commands::config::show(&config_path, &output),
                Some(ConfigCommands::Set { key, value }) => {
                    commands::config::set(key, value, &config_path, &output)
                }
            };
        }
        command => command,
    };

    let config = Config::load_from_path(&config_path).context("Failed to load configuration")?;
    init_logging(&config.log_level);
    debug!(config_file = %config_path.display(), api_url = %config.api_url, "Configuration loaded");

    match command {
        Commands::Push {
            file,
            no_merge,
            workspace_id,
        } => commands::push::push(&config, &file, workspace_id, no_merge, &output).await,
        Commands::Pull {
            output: path,
            workspace_id,
        } => commands::pull::pull(&config, workspace_id, path.as_deref(), &output).await,
        Commands::Inspect { file } => commands::inspect::inspect(&file, &output),
        Commands::Status => commands::status::show(&config, &config_path, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Log to stderr so stdout stays clean for JSON and pulled documents
fn init_logging(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "archsync_core={},archsync_cli={}",
            log_level, log_level
        ))
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
