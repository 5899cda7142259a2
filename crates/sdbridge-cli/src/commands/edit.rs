//! Legacy edit-endpoint write.

use std::path::PathBuf;

use clap::Args;

use crate::output;
use sdbridge_core::error::AppError;
use sdbridge_service::notice::{Notice, Operation};
use sdbridge_service::{DeviceContext, LocalFile};

/// Arguments for the edit command
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Target path on the card
    pub name: String,

    /// Local file with the new contents
    pub file: PathBuf,
}

/// Execute the edit command
pub async fn execute(args: &EditArgs, ctx: &DeviceContext) -> Result<(), AppError> {
    let mut file = LocalFile::read(&args.file).await?;
    file.name = args.name.clone();

    ctx.transfers
        .edit(file)
        .await
        .map_err(|e| super::report(Operation::Edit, e))?;

    output::print_notice(&Notice::done(Operation::Edit));
    Ok(())
}
