//! File delete command.

use clap::Args;

use crate::output;
use sdbridge_core::error::AppError;
use sdbridge_service::DeviceContext;
use sdbridge_service::notice::{Notice, Operation};

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Path of the file on the card
    pub path: String,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the delete command
pub async fn execute(args: &DeleteArgs, ctx: &DeviceContext) -> Result<(), AppError> {
    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete '{}' from the SD card?", args.path))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    ctx.transfers
        .delete(&args.path)
        .await
        .map_err(|e| super::report(Operation::Delete, e))?;

    output::print_notice(&Notice::done(Operation::Delete));
    Ok(())
}
