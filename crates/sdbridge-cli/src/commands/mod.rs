//! CLI command definitions and dispatch.

pub mod browse;
pub mod config;
pub mod delete;
pub mod download;
pub mod edit;
pub mod ls;
pub mod status;
pub mod tree;
pub mod upload;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::task::JoinHandle;

use crate::output::{self, OutputFormat};
use sdbridge_client::HttpDeviceClient;
use sdbridge_core::config::AppConfig;
use sdbridge_core::error::AppError;
use sdbridge_service::notice::{Notice, Operation};
use sdbridge_service::{DebugLog, DeviceContext, TransferController};

/// SD Bridge: browse and manage the SD card behind a printer bridge
#[derive(Debug, Parser)]
#[command(name = "sdbridge", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Device base URL, overriding the configuration
    #[arg(short, long)]
    pub url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show Wi-Fi and Bluetooth status once
    Status(status::StatusArgs),
    /// List one directory
    Ls(ls::LsArgs),
    /// Show the file tree
    Tree(tree::TreeArgs),
    /// Upload a local file to the card root
    Upload(upload::UploadArgs),
    /// Download a file from the card
    Download(download::DownloadArgs),
    /// Delete a file from the card
    Delete(delete::DeleteArgs),
    /// Write a file through the legacy edit endpoint
    Edit(edit::EditArgs),
    /// Browse the card interactively
    Browse,
    /// Poll status until interrupted
    Watch(watch::WatchArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, debug_log: DebugLog) -> Result<(), AppError> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &self.config, self.url.as_deref(), self.format).await;
        }

        let config = load_config(&self.config, self.url.as_deref())?;
        let ctx = connect(config, debug_log)?;

        match &self.command {
            Commands::Status(args) => status::execute(args, &ctx, self.format).await,
            Commands::Ls(args) => ls::execute(args, &ctx, self.format).await,
            Commands::Tree(args) => tree::execute(args, &ctx, self.format).await,
            Commands::Upload(args) => upload::execute(args, &ctx).await,
            Commands::Download(args) => download::execute(args, &ctx).await,
            Commands::Delete(args) => delete::execute(args, &ctx).await,
            Commands::Edit(args) => edit::execute(args, &ctx).await,
            Commands::Browse => browse::execute(&ctx).await,
            Commands::Watch(args) => watch::execute(args, &ctx, self.format).await,
            Commands::Config(_) => Ok(()),
        }
    }
}

/// Helper: load configuration from file, applying the `--url` override
pub fn load_config(config_path: &str, url: Option<&str>) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(config_path)?;
    match url {
        Some(url) => config.with_base_url(url),
        None => Ok(config),
    }
}

/// Helper: build the HTTP client and the device services
pub fn connect(config: AppConfig, debug_log: DebugLog) -> Result<DeviceContext, AppError> {
    let client = HttpDeviceClient::new(&config.device)?;
    tracing::debug!("Connecting to {}", config.device.base_url);
    Ok(DeviceContext::new(config, Arc::new(client), debug_log))
}

/// Helper: show the notice for a failed operation and hand the error back
pub fn report(operation: Operation, err: AppError) -> AppError {
    tracing::debug!("{:?} failed: {}", operation, err);
    output::print_notice(&Notice::from_error(operation, &err));
    err
}

/// Helper: print transfer progress to stderr until the returned task is
/// aborted
pub fn spawn_progress(transfers: &Arc<TransferController>, label: &'static str) -> JoinHandle<()> {
    let mut updates = transfers.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            if let Some(line) = output::progress_line(label, &view) {
                eprint!("\r{}", line);
            }
        }
    })
}

/// Helper: stop a progress task and end its line
pub fn finish_progress(task: JoinHandle<()>) {
    task.abort();
    eprintln!();
}
