//! Shared value types used across crates.

pub mod endpoint;
pub mod progress;

pub use endpoint::Endpoint;
pub use progress::{ProgressSink, TransferProgress};
