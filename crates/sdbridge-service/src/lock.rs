//! Single-resource lock guarding the device's SD card.
//!
//! The device can serve only one SD-card operation at a time. Every
//! operation that touches the card (upload, download, delete, legacy edit,
//! and the root listing) must hold a [`DeviceLockGuard`] for its whole
//! duration. The guard clears the flag when dropped, so the lock is
//! released on every exit path: success, device error, transport error,
//! early return or panic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sdbridge_core::error::AppError;
use sdbridge_core::result::AppResult;

/// Shared busy flag. Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct DeviceLock {
    busy: Arc<AtomicBool>,
}

impl DeviceLock {
    /// Creates a released lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operation currently holds the lock.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Takes the lock for `operation`, or rejects immediately.
    ///
    /// A rejection leaves the lock untouched and is reported as
    /// [`ErrorKind::DeviceBusy`](sdbridge_core::error::ErrorKind::DeviceBusy),
    /// the same kind the device uses for `SDBUSY`.
    pub fn try_acquire(&self, operation: &'static str) -> AppResult<DeviceLockGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::debug!(operation, "Device lock contended");
                AppError::device_busy("SD card is busy")
            })?;

        tracing::trace!(operation, "Device lock acquired");
        Ok(DeviceLockGuard {
            busy: Arc::clone(&self.busy),
            operation,
        })
    }
}

/// Proof of holding the [`DeviceLock`]; releases it on drop.
#[derive(Debug)]
#[must_use = "the device lock is released as soon as the guard is dropped"]
pub struct DeviceLockGuard {
    busy: Arc<AtomicBool>,
    operation: &'static str,
}

impl DeviceLockGuard {
    /// Name of the operation holding the lock.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Drop for DeviceLockGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        tracing::trace!(operation = self.operation, "Device lock released");
    }
}
