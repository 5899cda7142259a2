//! SD Bridge CLI entry point.

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use sdbridge_service::{DebugLog, DebugLogLayer};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let debug_log = DebugLog::default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                ),
        )
        .with(DebugLogLayer::new(debug_log.clone()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute(debug_log).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
