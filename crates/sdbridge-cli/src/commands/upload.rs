//! File upload command.

use std::path::PathBuf;

use clap::Args;

use crate::output;
use sdbridge_core::error::AppError;
use sdbridge_service::notice::{Notice, Operation};
use sdbridge_service::{DeviceContext, LocalFile};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Override file name on the card
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Execute the upload command
pub async fn execute(args: &UploadArgs, ctx: &DeviceContext) -> Result<(), AppError> {
    let mut file = LocalFile::read(&args.file).await?;
    if let Some(name) = &args.name {
        file.name = name.clone();
    }

    println!("Uploading '{}' ({} bytes)...", file.name, file.data.len());

    let progress = super::spawn_progress(&ctx.transfers, "Uploading");
    let result = ctx.transfers.upload(file).await;
    super::finish_progress(progress);

    result.map_err(|e| super::report(Operation::Upload, e))?;
    output::print_notice(&Notice::done(Operation::Upload));
    Ok(())
}
