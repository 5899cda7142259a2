//! Core traits defined in `sdbridge-core` and implemented by other crates.

pub mod transport;

pub use transport::{DeviceReply, DeviceRequest, DeviceTransport, MultipartUpload};
