//! One-shot status command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use sdbridge_core::error::AppError;
use sdbridge_entity::status::StatusView;
use sdbridge_service::{DashboardStatus, DeviceContext};

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Skip the Bluetooth endpoint
    #[arg(long)]
    pub no_bluetooth: bool,
}

/// Status display row
#[derive(Debug, Serialize, Tabled)]
pub struct StatusRow {
    /// Wi-Fi or BT
    link: String,
    /// Badge text
    status: String,
    /// Badge emphasis
    tone: String,
}

impl From<&StatusView> for StatusRow {
    fn from(view: &StatusView) -> Self {
        Self {
            link: view.kind.to_string(),
            status: view.label(),
            tone: format!("{:?}", view.tone()).to_lowercase(),
        }
    }
}

/// Rows for a dashboard snapshot
pub fn rows(status: &DashboardStatus) -> Vec<StatusRow> {
    std::iter::once(&status.wifi)
        .chain(status.bluetooth.as_ref())
        .map(StatusRow::from)
        .collect()
}

/// Execute the status command
pub async fn execute(
    args: &StatusArgs,
    ctx: &DeviceContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let include_bluetooth = ctx.config.polling.bluetooth && !args.no_bluetooth;
    let status = ctx.status.poll_once(include_bluetooth).await;

    match format {
        OutputFormat::Table => {
            println!("Device: {}", ctx.transport.base_url());
            output::print_list(&rows(&status), format);
        }
        OutputFormat::Json => output::print_item(&status, format),
    }
    Ok(())
}
