//! Device connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How to reach the device and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeviceConfig {
    /// Base URL of the device web server.
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,
    /// Timeout for `/wifistatus` and `/btstatus` in seconds.
    #[serde(default = "default_status_timeout")]
    #[validate(range(min = 1, max = 60))]
    pub status_timeout_seconds: u64,
    /// Timeout for `/list` in seconds.
    #[serde(default = "default_list_timeout")]
    #[validate(range(min = 1, max = 120))]
    pub list_timeout_seconds: u64,
    /// Optional timeout for `/delete` and `/relinquish`. Unbounded when unset.
    #[serde(default)]
    #[validate(range(min = 1, max = 120))]
    pub command_timeout_seconds: Option<u64>,
    /// Optional timeout for uploads and downloads. Unbounded when unset.
    #[serde(default)]
    pub transfer_timeout_seconds: Option<u64>,
    /// SSID the device advertises in access-point mode.
    #[serde(default = "default_ap_ssid")]
    pub ap_ssid: String,
}

impl DeviceConfig {
    /// Status poll timeout.
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_seconds)
    }

    /// Directory listing timeout.
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_seconds)
    }

    /// Delete / relinquish timeout, if any.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_seconds.map(Duration::from_secs)
    }

    /// Upload / download timeout, if any.
    pub fn transfer_timeout(&self) -> Option<Duration> {
        self.transfer_timeout_seconds.map(Duration::from_secs)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            status_timeout_seconds: default_status_timeout(),
            list_timeout_seconds: default_list_timeout(),
            command_timeout_seconds: None,
            transfer_timeout_seconds: None,
            ap_ssid: default_ap_ssid(),
        }
    }
}

fn default_base_url() -> String {
    "http://192.168.4.1".to_string()
}

fn default_status_timeout() -> u64 {
    5
}

fn default_list_timeout() -> u64 {
    10
}

fn default_ap_ssid() -> String {
    "PERMA".to_string()
}
