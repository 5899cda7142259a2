//! Status polling and debug panel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status poller timer settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PollingConfig {
    /// Seconds between two status polls.
    #[serde(default = "default_interval")]
    #[validate(range(min = 1, max = 3600))]
    pub interval_seconds: u64,
    /// Whether the Bluetooth status is polled alongside Wi-Fi.
    #[serde(default = "default_true")]
    pub bluetooth: bool,
}

impl PollingConfig {
    /// Poll interval.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            bluetooth: true,
        }
    }
}

/// Debug panel ring buffer settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DebugLogConfig {
    /// Maximum number of retained entries.
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 1000))]
    pub capacity: usize,
}

impl Default for DebugLogConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_interval() -> u64 {
    5
}

fn default_capacity() -> usize {
    20
}

fn default_true() -> bool {
    true
}
