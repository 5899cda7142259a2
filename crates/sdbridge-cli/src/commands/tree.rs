//! File tree command.

use clap::Args;

use crate::output::{self, OutputFormat};
use sdbridge_core::error::AppError;
use sdbridge_service::DeviceContext;
use sdbridge_service::notice::Operation;

/// Arguments for the tree command
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Folder levels to expand below the root
    #[arg(short, long, default_value = "0")]
    pub depth: usize,
}

/// Execute the tree command
pub async fn execute(args: &TreeArgs, ctx: &DeviceContext, format: OutputFormat) -> Result<(), AppError> {
    if let Err(e) = ctx.tree.reload().await {
        output::print_tree(&ctx.tree.rows().await, format);
        return Err(super::report(Operation::List, e));
    }

    ctx.tree.expand_to_depth(args.depth).await;
    output::print_tree(&ctx.tree.rows().await, format);
    Ok(())
}
