//! File download command.

use std::path::PathBuf;

use clap::Args;

use crate::output;
use sdbridge_core::error::AppError;
use sdbridge_service::DeviceContext;
use sdbridge_service::notice::{Notice, Operation};

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Path of the file on the card
    pub path: String,

    /// Target file or directory (defaults to the current directory)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

/// Execute the download command
pub async fn execute(args: &DownloadArgs, ctx: &DeviceContext) -> Result<(), AppError> {
    let progress = super::spawn_progress(&ctx.transfers, "Downloading");
    let result = ctx.transfers.download(&args.path).await;
    super::finish_progress(progress);

    let file = result.map_err(|e| super::report(Operation::Download, e))?;
    let written = file.save(&args.output).await?;

    output::print_notice(&Notice::done(Operation::Download));
    output::print_kv("Saved to", &written.display().to_string());
    output::print_kv("Size", &sdbridge_service::nice_bytes(file.data.len() as u64));
    Ok(())
}
