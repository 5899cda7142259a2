//! HTTP endpoints served by the device.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every endpoint the device web server exposes to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// `GET /wifistatus`
    WifiStatus,
    /// `GET /btstatus`
    BtStatus,
    /// `GET /list?dir=<path>`
    List,
    /// `GET /download?path=<path>`
    Download,
    /// `GET /delete?path=<path>`
    Delete,
    /// `GET /relinquish`
    Relinquish,
    /// `POST /upload` (multipart)
    Upload,
    /// `POST /edit` (multipart, legacy)
    Edit,
}

impl Endpoint {
    /// URL path of the endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Self::WifiStatus => "/wifistatus",
            Self::BtStatus => "/btstatus",
            Self::List => "/list",
            Self::Download => "/download",
            Self::Delete => "/delete",
            Self::Relinquish => "/relinquish",
            Self::Upload => "/upload",
            Self::Edit => "/edit",
        }
    }

    /// Whether the endpoint expects a multipart POST.
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload | Self::Edit)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
