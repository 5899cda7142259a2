//! `reqwest`-backed device transport.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc;

use sdbridge_core::config::device::DeviceConfig;
use sdbridge_core::error::AppError;
use sdbridge_core::result::AppResult;
use sdbridge_core::traits::{DeviceReply, DeviceRequest, DeviceTransport, MultipartUpload};
use sdbridge_core::types::{Endpoint, ProgressSink, TransferProgress};

use crate::error::map_reqwest_error;

/// Size of the slices an upload body is streamed in.
const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// HTTP client for the device web server.
#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    /// Shared connection pool.
    http: reqwest::Client,
    /// Device base URL without trailing slash.
    base_url: String,
}

impl HttpDeviceClient {
    /// Create a client from the device configuration.
    pub fn new(config: &DeviceConfig) -> AppResult<Self> {
        Self::with_base_url(&config.base_url)
    }

    /// Create a client for an explicit base URL.
    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sdbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        let client = Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        // Fail early on an unusable base URL.
        client.url(Endpoint::WifiStatus, None)?;
        Ok(client)
    }

    /// Absolute URL for an endpoint with its optional query parameter.
    fn url(&self, endpoint: Endpoint, query: Option<&(&'static str, String)>) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint.path())).map_err(|e| {
            AppError::configuration(format!("Invalid device URL '{}': {e}", self.base_url))
        })?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    fn request(&self, request: &DeviceRequest) -> AppResult<reqwest::RequestBuilder> {
        let url = self.url(request.endpoint, request.query.as_ref())?;
        let mut builder = self.http.get(url);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }
}

#[async_trait]
impl DeviceTransport for HttpDeviceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, request: DeviceRequest) -> AppResult<DeviceReply> {
        let response = self
            .request(&request)?
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(
            endpoint = %request.endpoint,
            status,
            bytes = body.len(),
            "Device GET completed"
        );

        Ok(DeviceReply { status, body })
    }

    async fn get_with_progress(
        &self,
        request: DeviceRequest,
        progress: &dyn ProgressSink,
    ) -> AppResult<DeviceReply> {
        let response = self
            .request(&request)?
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let total = response.content_length();
        let mut buffer = BytesMut::with_capacity(total.unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            buffer.extend_from_slice(&chunk);
            progress.report(TransferProgress::new(buffer.len() as u64, total));
        }

        tracing::debug!(
            endpoint = %request.endpoint,
            status,
            bytes = buffer.len(),
            "Device download completed"
        );

        Ok(DeviceReply {
            status,
            body: buffer.freeze(),
        })
    }

    async fn post_multipart(
        &self,
        upload: MultipartUpload,
        progress: &dyn ProgressSink,
    ) -> AppResult<DeviceReply> {
        let url = self.url(upload.endpoint, None)?;
        let total = upload.data.len() as u64;

        // The body stream runs inside reqwest, so it reports consumed bytes
        // over a channel that is drained here alongside the request.
        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel::<u64>();
        let chunks = split_chunks(&upload.data, UPLOAD_CHUNK_SIZE);
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            let _ = sent_tx.send(chunk.len() as u64);
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| AppError::validation(format!("Invalid content type: {e}")))?;
        let form = Form::new().part(upload.field, part);

        let mut builder = self.http.post(url).multipart(form);
        if let Some(timeout) = upload.timeout {
            builder = builder.timeout(timeout);
        }

        let send = builder.send();
        tokio::pin!(send);

        let mut transferred = 0u64;
        let response = loop {
            tokio::select! {
                result = &mut send => break result.map_err(map_reqwest_error)?,
                Some(sent) = sent_rx.recv() => {
                    transferred += sent;
                    progress.report(TransferProgress::new(transferred, Some(total)));
                }
            }
        };
        while let Ok(sent) = sent_rx.try_recv() {
            transferred += sent;
            progress.report(TransferProgress::new(transferred, Some(total)));
        }

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(
            endpoint = %upload.endpoint,
            file_name = %upload.file_name,
            status,
            bytes = total,
            "Device upload completed"
        );

        Ok(DeviceReply { status, body })
    }
}

/// Split a buffer into cheap reference-counted slices.
fn split_chunks(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}
