//! SD Bridge Monitor: device status dashboard
//!
//! Loads the configuration, connects to the device, and polls the Wi-Fi and
//! Bluetooth status endpoints on a timer until interrupted.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use sdbridge_client::HttpDeviceClient;
use sdbridge_core::config::AppConfig;
use sdbridge_core::error::AppError;
use sdbridge_service::{DashboardStatus, DebugLog, DebugLogLayer, DeviceContext};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let debug_log = DebugLog::new(config.debug_log.capacity);
    init_logging(&config, &debug_log);

    if let Err(e) = run(config, debug_log).await {
        tracing::error!("Monitor error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("SDBRIDGE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    let env = std::env::var("SDBRIDGE_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = format!("config/{}.toml", env);

    AppConfig::load_layers(&[&config_path, &env_config_path])
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig, debug_log: &DebugLog) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let panel = DebugLogLayer::new(debug_log.clone());

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_filter(filter),
                )
                .with(panel)
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(fmt::layer().pretty().with_target(true).with_filter(filter))
                .with(panel)
                .init();
        }
    }
}

/// Main monitor run function
async fn run(config: AppConfig, debug_log: DebugLog) -> Result<(), AppError> {
    tracing::info!("Starting SD Bridge Monitor v{}", env!("CARGO_PKG_VERSION"));

    let client = HttpDeviceClient::new(&config.device)?;
    let interval = config.polling.interval();
    let include_bluetooth = config.polling.bluetooth;
    let ctx = DeviceContext::new(config, Arc::new(client), debug_log);
    tracing::info!(
        "Polling {} every {}s",
        ctx.transport.base_url(),
        interval.as_secs()
    );

    let (updates_tx, mut updates) = watch::channel(DashboardStatus::pending());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = Arc::clone(&ctx.status);
    let poll_task = tokio::spawn(async move {
        poller
            .run(interval, include_bluetooth, updates_tx, shutdown_rx)
            .await;
    });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                match &status.bluetooth {
                    Some(bt) => tracing::info!(
                        wifi = %status.wifi.label(),
                        bluetooth = %bt.label(),
                        "Dashboard updated"
                    ),
                    None => tracing::info!(wifi = %status.wifi.label(), "Dashboard updated"),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping poller...");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    poll_task
        .await
        .map_err(|e| AppError::internal(format!("Poller task failed: {}", e)))?;

    tracing::info!(
        "SD Bridge Monitor stopped ({} debug lines retained)",
        ctx.debug_log.len()
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
