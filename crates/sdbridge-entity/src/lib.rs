//! # sdbridge-entity
//!
//! Domain values for SD Bridge: remote file nodes as listed by the device,
//! the closed set of Wi-Fi and Bluetooth states, and the parser for the
//! device's tagged plain-text replies (`LIST:`, `DELETE:`, `DOWNLOAD:`,
//! `WIFI:`, `BT:`).

pub mod node;
pub mod protocol;
pub mod status;

pub use node::{FileNode, ListingItem, NodeKind};
pub use protocol::{ReasonCode, ReplyTag};
pub use status::{StatusKind, StatusState, StatusView, Tone};
