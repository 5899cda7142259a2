//! Single directory listing.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use sdbridge_core::error::AppError;
use sdbridge_entity::node::FileNode;
use sdbridge_service::notice::Operation;
use sdbridge_service::{DeviceContext, nice_bytes};

/// Arguments for the ls command
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Directory on the card
    #[arg(default_value = "/")]
    pub dir: String,
}

/// Listing display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Name
    name: String,
    /// Path
    path: String,
    /// Size or "Folder"
    size: String,
}

impl From<&FileNode> for EntryRow {
    fn from(node: &FileNode) -> Self {
        Self {
            name: node.name.clone(),
            path: node.path.clone(),
            size: if node.is_dir() {
                "Folder".to_string()
            } else {
                nice_bytes(node.size.unwrap_or(0))
            },
        }
    }
}

/// Execute the ls command
pub async fn execute(args: &LsArgs, ctx: &DeviceContext, format: OutputFormat) -> Result<(), AppError> {
    let nodes = ctx
        .tree
        .list_directory(&args.dir)
        .await
        .map_err(|e| super::report(Operation::List, e))?;

    match format {
        OutputFormat::Table => {
            let rows: Vec<EntryRow> = nodes.iter().map(EntryRow::from).collect();
            output::print_list(&rows, format);
        }
        OutputFormat::Json => output::print_item(&nodes, format),
    }
    Ok(())
}
