//! # sdbridge-client
//!
//! HTTP transport for the device web server, built on `reqwest`.
//! [`HttpDeviceClient`] implements
//! [`DeviceTransport`](sdbridge_core::traits::DeviceTransport); nothing
//! else in the workspace opens a connection to the device.

pub mod client;
pub mod error;

pub use client::HttpDeviceClient;
