//! Status dashboard loop.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::sync::watch;

use crate::output::{self, OutputFormat};
use sdbridge_core::error::AppError;
use sdbridge_service::{DashboardStatus, DeviceContext};

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (defaults to the configured interval)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Skip the Bluetooth endpoint
    #[arg(long)]
    pub no_bluetooth: bool,
}

/// Execute the watch command
pub async fn execute(
    args: &WatchArgs,
    ctx: &DeviceContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.polling.interval());
    let include_bluetooth = ctx.config.polling.bluetooth && !args.no_bluetooth;

    let (updates_tx, mut updates) = watch::channel(DashboardStatus::pending());
    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = Arc::clone(&ctx.status);
    let task = tokio::spawn(async move {
        poller
            .run(interval, include_bluetooth, updates_tx, stop_rx)
            .await;
    });

    if format == OutputFormat::Table {
        println!(
            "Polling {} every {}s, press Ctrl-C to stop",
            ctx.transport.base_url(),
            interval.as_secs()
        );
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                print_snapshot(&status, format);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // The poller may already have stopped on its own.
    let _ = stop_tx.send(true);
    task.await
        .map_err(|e| AppError::internal(format!("Status poller failed: {}", e)))?;
    Ok(())
}

fn print_snapshot(status: &DashboardStatus, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut line = format!(
                "[{}] WiFi: {}",
                status.polled_at.format("%H:%M:%S"),
                status.wifi.label()
            );
            if let Some(bt) = &status.bluetooth {
                line.push_str(&format!(" | BT: {}", bt.label()));
            }
            println!("{}", line);
        }
        OutputFormat::Json => match serde_json::to_string(status) {
            Ok(json) => println!("{}", json),
            Err(e) => output::print_error(&format!("Cannot encode status: {}", e)),
        },
    }
}
