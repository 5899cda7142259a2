//! Transfer progress reporting.

use serde::{Deserialize, Serialize};

/// Bytes moved so far, and the expected total when the peer announced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Bytes transferred so far.
    pub transferred: u64,
    /// Total size, if known.
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Create a progress value.
    pub fn new(transferred: u64, total: Option<u64>) -> Self {
        Self { transferred, total }
    }

    /// Whether the total size is known.
    pub fn is_computable(&self) -> bool {
        self.total.is_some()
    }

    /// Completion percentage, if the total is known and non-zero.
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(0) | None => None,
            Some(total) => Some(self.transferred as f64 / total as f64 * 100.0),
        }
    }
}

/// Receiver of progress updates emitted by a transport during a transfer.
pub trait ProgressSink: Send + Sync {
    /// Record a progress update.
    fn report(&self, progress: TransferProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(TransferProgress) + Send + Sync,
{
    fn report(&self, progress: TransferProgress) {
        self(progress)
    }
}

/// A sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: TransferProgress) {}
}
