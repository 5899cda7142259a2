//! Wiring of the shared services for one device.

use std::sync::Arc;

use sdbridge_core::config::AppConfig;
use sdbridge_core::traits::DeviceTransport;

use crate::debug_log::DebugLog;
use crate::lock::DeviceLock;
use crate::status::StatusPoller;
use crate::transfer::TransferController;
use crate::tree::RemoteFileTree;

/// Everything a front end needs to drive one device.
///
/// The tree and the transfer controller share one [`DeviceLock`], so a root
/// reload and a transfer can never overlap.
#[derive(Debug, Clone)]
pub struct DeviceContext {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// HTTP transport to the device
    pub transport: Arc<dyn DeviceTransport>,
    /// SD-card lock
    pub lock: DeviceLock,
    /// Debug panel buffer
    pub debug_log: DebugLog,

    // ── Services ─────────────────────────────────────────────
    /// Remote file tree
    pub tree: Arc<RemoteFileTree>,
    /// Upload / download / delete / edit
    pub transfers: Arc<TransferController>,
    /// Status poller
    pub status: Arc<StatusPoller>,
}

impl DeviceContext {
    /// Builds every service around `transport`.
    pub fn new(config: AppConfig, transport: Arc<dyn DeviceTransport>, debug_log: DebugLog) -> Self {
        let lock = DeviceLock::new();
        let tree = Arc::new(RemoteFileTree::new(
            Arc::clone(&transport),
            lock.clone(),
            config.device.list_timeout(),
        ));
        let transfers = Arc::new(TransferController::new(
            Arc::clone(&transport),
            lock.clone(),
            Arc::clone(&tree),
            &config.device,
        ));
        let status = Arc::new(StatusPoller::new(Arc::clone(&transport), &config.device));

        tracing::debug!("Device context ready for {}", transport.base_url());

        Self {
            config: Arc::new(config),
            transport,
            lock,
            debug_log,
            tree,
            transfers,
            status,
        }
    }
}
