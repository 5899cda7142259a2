//! # sdbridge-service
//!
//! Client-side logic for SD Bridge: the SD-card lock, the status poller,
//! the lazily expanded remote file tree and its rendering, the transfer
//! controller, user notices, and the bounded debug log.
//!
//! Services receive the [`DeviceTransport`](sdbridge_core::traits::DeviceTransport)
//! at construction time as an `Arc`, so they run unchanged against the
//! HTTP client or an in-memory fake.

pub mod context;
pub mod debug_log;
pub mod format;
pub mod lock;
pub mod notice;
pub mod status;
pub mod transfer;
pub mod tree;

#[cfg(test)]
mod testing;

pub use context::DeviceContext;
pub use debug_log::{DebugLog, DebugLogLayer};
pub use format::nice_bytes;
pub use lock::{DeviceLock, DeviceLockGuard};
pub use notice::{Notice, NoticeLevel, Operation};
pub use status::{DashboardStatus, StatusPoller};
pub use transfer::{DownloadedFile, LocalFile, TransferController, TransferView};
pub use tree::{RemoteFileTree, ToggleOutcome, TreeRow};
