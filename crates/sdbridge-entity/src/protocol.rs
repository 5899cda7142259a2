//! Parser for the device's tagged plain-text replies.
//!
//! The device answers most requests with a short ASCII body of the form
//! `<TAG>:<payload>`. Error replies carry one of a fixed set of reason
//! codes; success replies carry either a payload (`WIFI:Connected:<ip>`)
//! or, for listings, a JSON array instead of a tag.

use std::fmt;

use sdbridge_core::error::AppError;
use sdbridge_core::result::AppResult;
use sdbridge_core::traits::DeviceReply;

use crate::node::{FileNode, ListingItem};
use crate::status::{StatusKind, StatusState, StatusView};

/// Prefix identifying the kind of a tagged reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyTag {
    /// `LIST:`
    List,
    /// `DELETE:`
    Delete,
    /// `DOWNLOAD:`
    Download,
    /// `WIFI:`
    Wifi,
    /// `BT:`
    Bluetooth,
}

impl ReplyTag {
    /// The literal prefix, including the colon.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::List => "LIST:",
            Self::Delete => "DELETE:",
            Self::Download => "DOWNLOAD:",
            Self::Wifi => "WIFI:",
            Self::Bluetooth => "BT:",
        }
    }

    /// Payload after the prefix, if `body` carries this tag.
    pub fn strip<'a>(&self, body: &'a str) -> Option<&'a str> {
        body.strip_prefix(self.prefix())
    }
}

/// Reason codes the device embeds in tagged error replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    /// `SDBUSY`: the SD card is used by the printer or another request.
    SdBusy,
    /// `BADARGS`: a required query parameter is missing.
    BadArgs,
    /// `BADPATH`: the path does not exist.
    BadPath,
    /// `NOTDIR`: the path is not a directory.
    NotDir,
    /// `OK`: the operation succeeded.
    Ok,
}

impl ReasonCode {
    /// Parse an exact reason code; surrounding whitespace is ignored.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "SDBUSY" => Some(Self::SdBusy),
            "BADARGS" => Some(Self::BadArgs),
            "BADPATH" => Some(Self::BadPath),
            "NOTDIR" => Some(Self::NotDir),
            "OK" => Some(Self::Ok),
            _ => None,
        }
    }

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SdBusy => "SDBUSY",
            Self::BadArgs => "BADARGS",
            Self::BadPath => "BADPATH",
            Self::NotDir => "NOTDIR",
            Self::Ok => "OK",
        }
    }

    /// Convert a failure code into an error; `OK` yields `None`.
    pub fn into_error(self, tag: ReplyTag) -> Option<AppError> {
        let message = format!("{}{}", tag.prefix(), self.as_str());
        match self {
            Self::SdBusy => Some(AppError::device_busy(message)),
            Self::BadArgs | Self::BadPath | Self::NotDir => Some(AppError::invalid_request(message)),
            Self::Ok => None,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a tagged error reply into an error, if the body carries `tag`.
///
/// Returns `Some(Err(..))` for a known failure code, `Some(Ok(()))` for
/// `OK`, a parse error for an unknown code, and `None` when the body is not
/// tagged at all.
fn tagged_outcome(tag: ReplyTag, body: &str) -> Option<AppResult<()>> {
    let payload = tag.strip(body)?;
    let outcome = match ReasonCode::parse(payload) {
        Some(code) => match code.into_error(tag) {
            Some(err) => Err(err),
            None => Ok(()),
        },
        None => Err(AppError::parse(format!(
            "Unrecognized {} reply: {}",
            tag.prefix(),
            body.trim()
        ))),
    };
    Some(outcome)
}

/// Parse a `/list` reply for directory `listed_dir`.
pub fn parse_listing(reply: &DeviceReply, listed_dir: &str) -> AppResult<Vec<FileNode>> {
    let body = reply.text();

    if let Some(outcome) = tagged_outcome(ReplyTag::List, &body) {
        outcome?;
        return Err(AppError::parse(format!(
            "Listing reply carried no entries: {}",
            body.trim()
        )));
    }

    if !reply.is_ok() {
        return Err(AppError::transport(format!(
            "HTTP {}: {}",
            reply.status,
            preview(&body, 100)
        )));
    }

    let items: Vec<ListingItem> = serde_json::from_str(&body)?;
    Ok(items
        .into_iter()
        .map(|item| item.into_node(listed_dir))
        .collect())
}

/// Parse a `/delete` reply. An untagged 200 body counts as success.
pub fn parse_delete(reply: &DeviceReply) -> AppResult<()> {
    let body = reply.text();

    if let Some(outcome) = tagged_outcome(ReplyTag::Delete, &body) {
        return outcome;
    }

    if reply.is_ok() {
        Ok(())
    } else {
        Err(AppError::transport(format!(
            "HTTP {}: {}",
            reply.status,
            preview(&body, 100)
        )))
    }
}

/// Detect a legacy `DOWNLOAD:<REASON>` error reply.
///
/// Only a body consisting of exactly the tag and a known failure code is
/// treated as an error, so file contents that merely start with the tag
/// text are passed through.
pub fn parse_download_error(body: &[u8]) -> Option<AppError> {
    let prefix = ReplyTag::Download.prefix().as_bytes();
    if !body.starts_with(prefix) || body.len() > prefix.len() + 16 {
        return None;
    }
    let payload = std::str::from_utf8(&body[prefix.len()..]).ok()?;
    ReasonCode::parse(payload)?.into_error(ReplyTag::Download)
}

/// Parse a `/wifistatus` body. `ap_ssid` is shown for access-point mode.
pub fn parse_wifi_status(body: &str, ap_ssid: &str) -> StatusView {
    let state = match ReplyTag::Wifi.strip(body) {
        Some(status) if status.contains("Connected:") => {
            let ip = status.split(':').nth(1).unwrap_or_default().trim();
            StatusState::WifiConnected(ip.to_string())
        }
        Some(status) if status.contains("Connecting") => StatusState::WifiConnecting,
        Some(status) if status.contains("Failed") => StatusState::WifiFailed,
        Some(status) if status.contains("AP_Mode") => StatusState::WifiApMode(ap_ssid.to_string()),
        _ => StatusState::Unknown,
    };
    StatusView::new(StatusKind::Wifi, state)
}

/// Parse a `/btstatus` body.
pub fn parse_bluetooth_status(body: &str) -> StatusView {
    let state = match ReplyTag::Bluetooth.strip(body).map(str::trim) {
        Some("Connected") => StatusState::BluetoothConnected,
        Some("Ready") => StatusState::BluetoothReady,
        Some("Disabled") => StatusState::BluetoothDisabled,
        _ => StatusState::Unknown,
    };
    StatusView::new(StatusKind::Bluetooth, state)
}

/// First `max` characters of a body, for log lines and error messages.
pub fn preview(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
