//! Device connectivity states shown on the status dashboard.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which status endpoint a view was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// `/wifistatus`
    Wifi,
    /// `/btstatus`
    Bluetooth,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wifi => write!(f, "WiFi"),
            Self::Bluetooth => write!(f, "BT"),
        }
    }
}

/// Why a status endpoint could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "status")]
pub enum UnreachableReason {
    /// The device answered with a non-200 status.
    HttpStatus(u16),
    /// No answer within the timeout.
    Timeout,
    /// The connection could not be established or broke.
    ConnectionError,
}

/// Parsed state of one status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum StatusState {
    /// Wi-Fi joined a network; carries the station IP.
    WifiConnected(String),
    /// Wi-Fi is joining a network.
    WifiConnecting,
    /// Wi-Fi failed to join and fell back to access-point mode.
    WifiFailed,
    /// Wi-Fi serves its own access point; carries the SSID.
    WifiApMode(String),
    /// A Bluetooth client is connected.
    BluetoothConnected,
    /// Bluetooth is advertising with no client.
    BluetoothReady,
    /// Bluetooth is off.
    BluetoothDisabled,
    /// The reply was understood as a status reply but its payload was not.
    Unknown,
    /// The endpoint could not be read.
    Unreachable(UnreachableReason),
}

/// Visual emphasis of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Healthy.
    Success,
    /// Informational.
    Info,
    /// Transient problem.
    Warning,
    /// Failure.
    Danger,
    /// Neutral or unknown.
    Secondary,
}

/// A status reading ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    /// Source endpoint.
    pub kind: StatusKind,
    /// Parsed state.
    pub state: StatusState,
}

impl StatusView {
    /// Create a view.
    pub fn new(kind: StatusKind, state: StatusState) -> Self {
        Self { kind, state }
    }

    /// Whether the endpoint could not be read.
    pub fn is_unreachable(&self) -> bool {
        matches!(self.state, StatusState::Unreachable(_))
    }

    /// Badge text.
    pub fn label(&self) -> String {
        match &self.state {
            StatusState::WifiConnected(ip) => format!("Connected - IP: {ip}"),
            StatusState::WifiConnecting => "Connecting...".to_string(),
            StatusState::WifiFailed => "Connection Failed - AP Mode".to_string(),
            StatusState::WifiApMode(ssid) => format!("AP Mode - SSID: {ssid}"),
            StatusState::BluetoothConnected => "Connected".to_string(),
            StatusState::BluetoothReady => "Ready (No client)".to_string(),
            StatusState::BluetoothDisabled => "Disabled".to_string(),
            StatusState::Unknown => "Unknown".to_string(),
            StatusState::Unreachable(reason) => match (self.kind, reason) {
                (StatusKind::Wifi, UnreachableReason::HttpStatus(_)) => {
                    "Cannot reach device".to_string()
                }
                (StatusKind::Wifi, UnreachableReason::Timeout) => "Request timeout".to_string(),
                (StatusKind::Wifi, UnreachableReason::ConnectionError) => {
                    "Connection error".to_string()
                }
                (StatusKind::Bluetooth, UnreachableReason::Timeout) => "Timeout".to_string(),
                (StatusKind::Bluetooth, _) => "Error".to_string(),
            },
        }
    }

    /// Badge emphasis.
    pub fn tone(&self) -> Tone {
        match &self.state {
            StatusState::WifiConnected(_) | StatusState::BluetoothConnected => Tone::Success,
            StatusState::WifiConnecting | StatusState::Unreachable(_) => Tone::Warning,
            StatusState::WifiFailed => Tone::Danger,
            StatusState::WifiApMode(_) | StatusState::BluetoothReady => Tone::Info,
            StatusState::BluetoothDisabled | StatusState::Unknown => Tone::Secondary,
        }
    }
}
