//! Integration tests for the status poller.

mod helpers;

use std::time::Duration;

use tokio::sync::watch;

use sdbridge_entity::status::{StatusKind, StatusState, Tone, UnreachableReason};
use sdbridge_service::DashboardStatus;

#[tokio::test]
async fn test_connected_and_ready() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    let status = ctx.status.poll_once(true).await;
    assert_eq!(status.wifi.label(), "Connected - IP: 192.168.1.50");
    assert_eq!(status.wifi.tone(), Tone::Success);
    let bt = status.bluetooth.unwrap();
    assert_eq!(bt.label(), "Ready (No client)");
    assert_eq!(bt.tone(), Tone::Info);
}

#[tokio::test]
async fn test_ap_mode_uses_configured_ssid() {
    let device = helpers::FakeDevice::start().await;
    *device.state.wifi.lock().unwrap() = "WIFI:AP_Mode".to_string();
    let mut config = device.config();
    config.device.ap_ssid = "BRIDGE-42".to_string();
    let ctx = helpers::context_for(config);

    let view = ctx.status.fetch_status(StatusKind::Wifi).await;
    assert_eq!(view.label(), "AP Mode - SSID: BRIDGE-42");
}

#[tokio::test]
async fn test_http_error_is_unreachable() {
    let device = helpers::FakeDevice::start().await;
    *device.state.status_failure.lock().unwrap() = Some(503);
    let ctx = device.context();

    let view = ctx.status.fetch_status(StatusKind::Wifi).await;
    assert_eq!(
        view.state,
        StatusState::Unreachable(UnreachableReason::HttpStatus(503))
    );
    assert_eq!(view.label(), "Cannot reach device");
    assert_eq!(view.tone(), Tone::Warning);
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let url = helpers::closed_port_url().await;
    let config = sdbridge_core::config::AppConfig::default()
        .with_base_url(url)
        .unwrap();
    let ctx = helpers::context_for(config);

    let view = ctx.status.fetch_status(StatusKind::Bluetooth).await;
    assert_eq!(
        view.state,
        StatusState::Unreachable(UnreachableReason::ConnectionError)
    );
    assert_eq!(view.label(), "Error");
}

#[tokio::test]
async fn test_slow_device_times_out() {
    let device = helpers::FakeDevice::start().await;
    *device.state.status_delay.lock().unwrap() = Some(Duration::from_secs(3));
    let mut config = device.config();
    config.device.status_timeout_seconds = 1;
    let ctx = helpers::context_for(config);

    let view = ctx.status.fetch_status(StatusKind::Wifi).await;
    assert_eq!(view.state, StatusState::Unreachable(UnreachableReason::Timeout));
    assert_eq!(view.label(), "Request timeout");
}

#[tokio::test]
async fn test_status_lines_reach_debug_log() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();
    let subscriber = {
        use tracing_subscriber::layer::SubscriberExt;
        tracing_subscriber::registry()
            .with(sdbridge_service::DebugLogLayer::new(ctx.debug_log.clone()))
    };
    let _guard = tracing::subscriber::set_default(subscriber);

    ctx.status.fetch_status(StatusKind::Wifi).await;

    assert!(
        ctx.debug_log
            .messages()
            .iter()
            .any(|m| m == "WiFi status: WIFI:Connected:192.168.1.50")
    );
}

#[tokio::test]
async fn test_run_publishes_until_shutdown() {
    let device = helpers::FakeDevice::start().await;
    let ctx = device.context();

    let (tx, mut rx) = watch::channel(DashboardStatus::pending());
    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = ctx.status.clone();
    let task = tokio::spawn(async move {
        poller
            .run(Duration::from_millis(50), false, tx, stop_rx)
            .await;
    });

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().wifi.label(), "Connected - IP: 192.168.1.50");

    *device.state.wifi.lock().unwrap() = "WIFI:Connecting".to_string();
    loop {
        rx.changed().await.unwrap();
        if rx.borrow_and_update().wifi.label() == "Connecting..." {
            break;
        }
    }

    stop_tx.send(true).unwrap();
    task.await.unwrap();
    assert_eq!(device.state.count("GET /btstatus"), 0);
}
