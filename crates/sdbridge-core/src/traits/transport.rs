//! Transport trait for talking to the device web server.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::endpoint::Endpoint;
use crate::types::progress::ProgressSink;

/// A GET request against one device endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Single query parameter (`dir` or `path`), if any.
    pub query: Option<(&'static str, String)>,
    /// Request timeout; `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
}

impl DeviceRequest {
    /// Create a request without query or timeout.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            query: None,
            timeout: None,
        }
    }

    /// Attach the query parameter.
    pub fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query = Some((key, value.into()));
        self
    }

    /// Attach a timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A multipart POST carrying one file in the given form field.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    /// `/upload` or `/edit`.
    pub endpoint: Endpoint,
    /// Form field name.
    pub field: &'static str,
    /// File name sent with the part (the device stores it under this path).
    pub file_name: String,
    /// MIME type of the part.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
    /// Request timeout; `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
}

/// Raw status code and body returned by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl DeviceReply {
    /// Create a reply.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Trait for the HTTP plumbing between this client and the device.
///
/// Implementations only fail with `Timeout` or `Transport` errors; any HTTP
/// status is returned as a [`DeviceReply`] so callers can inspect tagged
/// bodies on non-success statuses.
#[async_trait]
pub trait DeviceTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Base URL of the device, for diagnostics.
    fn base_url(&self) -> &str;

    /// Perform a GET and buffer the whole body.
    async fn get(&self, request: DeviceRequest) -> AppResult<DeviceReply>;

    /// Perform a GET, reporting download progress while the body streams in.
    async fn get_with_progress(
        &self,
        request: DeviceRequest,
        progress: &dyn ProgressSink,
    ) -> AppResult<DeviceReply>;

    /// Perform a multipart POST, reporting upload progress.
    async fn post_multipart(
        &self,
        upload: MultipartUpload,
        progress: &dyn ProgressSink,
    ) -> AppResult<DeviceReply>;
}
