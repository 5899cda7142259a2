//! Device status polling.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time;

use sdbridge_core::config::DeviceConfig;
use sdbridge_core::error::ErrorKind;
use sdbridge_core::traits::{DeviceRequest, DeviceTransport};
use sdbridge_core::types::Endpoint;
use sdbridge_entity::protocol::{parse_bluetooth_status, parse_wifi_status, preview};
use sdbridge_entity::status::{StatusKind, StatusState, StatusView, UnreachableReason};

/// One dashboard refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStatus {
    /// Wi-Fi badge.
    pub wifi: StatusView,
    /// Bluetooth badge; `None` when Bluetooth polling is disabled.
    pub bluetooth: Option<StatusView>,
    /// When the poll finished.
    pub polled_at: DateTime<Utc>,
}

impl DashboardStatus {
    /// Placeholder shown before the first poll completes.
    pub fn pending() -> Self {
        Self {
            wifi: StatusView::new(StatusKind::Wifi, StatusState::Unknown),
            bluetooth: None,
            polled_at: Utc::now(),
        }
    }
}

/// Reads the two status endpoints and maps them to display states.
///
/// The poller never fails: every transport problem becomes an
/// [`StatusState::Unreachable`] reading.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    transport: Arc<dyn DeviceTransport>,
    timeout: Duration,
    ap_ssid: String,
}

impl StatusPoller {
    /// Creates a poller using the status timeout and AP SSID from `config`.
    pub fn new(transport: Arc<dyn DeviceTransport>, config: &DeviceConfig) -> Self {
        Self {
            transport,
            timeout: config.status_timeout(),
            ap_ssid: config.ap_ssid.clone(),
        }
    }

    /// Fetch and classify one status endpoint.
    pub async fn fetch_status(&self, kind: StatusKind) -> StatusView {
        let endpoint = match kind {
            StatusKind::Wifi => Endpoint::WifiStatus,
            StatusKind::Bluetooth => Endpoint::BtStatus,
        };
        let request = DeviceRequest::new(endpoint).with_timeout(Some(self.timeout));

        match self.transport.get(request).await {
            Ok(reply) if reply.is_ok() => {
                let body = reply.text();
                tracing::info!("{} status: {}", kind, preview(body.trim(), 100));
                match kind {
                    StatusKind::Wifi => parse_wifi_status(&body, &self.ap_ssid),
                    StatusKind::Bluetooth => parse_bluetooth_status(&body),
                }
            }
            Ok(reply) => {
                tracing::warn!("{} status error: HTTP {}", kind, reply.status);
                unreachable(kind, UnreachableReason::HttpStatus(reply.status))
            }
            Err(err) if err.kind == ErrorKind::Timeout => {
                tracing::warn!("{} status timeout", kind);
                unreachable(kind, UnreachableReason::Timeout)
            }
            Err(err) => {
                tracing::warn!("{} status fetch error: {}", kind, err.message);
                unreachable(kind, UnreachableReason::ConnectionError)
            }
        }
    }

    /// Poll Wi-Fi and, when `include_bluetooth` is set, Bluetooth.
    pub async fn poll_once(&self, include_bluetooth: bool) -> DashboardStatus {
        let wifi = self.fetch_status(StatusKind::Wifi).await;
        let bluetooth = if include_bluetooth {
            Some(self.fetch_status(StatusKind::Bluetooth).await)
        } else {
            None
        };
        DashboardStatus {
            wifi,
            bluetooth,
            polled_at: Utc::now(),
        }
    }

    /// Poll every `interval` and publish each snapshot on `updates` until
    /// `shutdown` turns `true`, its sender is dropped, or every receiver of
    /// `updates` is gone.
    ///
    /// The first poll runs immediately.
    pub async fn run(
        &self,
        interval: Duration,
        include_bluetooth: bool,
        updates: watch::Sender<DashboardStatus>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let snapshot = self.poll_once(include_bluetooth).await;
            if updates.send(snapshot).is_err() {
                tracing::debug!("No status subscribers left, stopping poller");
                break;
            }
        }

        tracing::debug!("Status poller stopped for {}", self.transport.base_url());
    }
}

fn unreachable(kind: StatusKind, reason: UnreachableReason) -> StatusView {
    StatusView::new(kind, StatusState::Unreachable(reason))
}
