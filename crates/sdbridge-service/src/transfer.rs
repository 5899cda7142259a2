//! Upload, download, delete and legacy edit against the device, serialized
//! by the [`DeviceLock`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use sdbridge_core::config::DeviceConfig;
use sdbridge_core::error::{AppError, ErrorKind};
use sdbridge_core::result::AppResult;
use sdbridge_core::traits::{DeviceReply, DeviceRequest, DeviceTransport, MultipartUpload};
use sdbridge_core::types::progress::NoProgress;
use sdbridge_core::types::{Endpoint, TransferProgress};
use sdbridge_entity::node::{file_name, normalize_path};
use sdbridge_entity::protocol::{parse_delete, parse_download_error, preview};

use crate::lock::DeviceLock;
use crate::tree::RemoteFileTree;

/// Multipart field the device reads uploads from.
const UPLOAD_FIELD: &str = "data";

/// Controller state for the UI adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferView {
    /// An operation holds the device lock.
    pub busy: bool,
    /// The upload control accepts input.
    pub upload_enabled: bool,
    /// The progress bar is shown.
    pub progress_visible: bool,
    /// Last computable progress.
    pub progress: TransferProgress,
}

impl Default for TransferView {
    fn default() -> Self {
        Self {
            busy: false,
            upload_enabled: true,
            progress_visible: false,
            progress: TransferProgress::default(),
        }
    }
}

/// A local file chosen for upload.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Name the file is stored under on the card, without leading slash.
    pub name: String,
    /// Contents.
    pub data: Bytes,
}

impl LocalFile {
    /// Create from in-memory contents.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, keeping its file name.
    pub async fn read(path: &Path) -> AppResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::validation(format!("Not a file: {}", path.display())))?;
        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Cannot read {}", path.display()), e)
        })?;
        Ok(Self::new(name, data))
    }
}

/// A file fetched from the card.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Remote path.
    pub path: String,
    /// Original file name.
    pub name: String,
    /// Contents.
    pub data: Bytes,
}

impl DownloadedFile {
    /// Write the contents to `target`. A directory target receives the file
    /// under its original name. Returns the written path.
    pub async fn save(&self, target: &Path) -> AppResult<PathBuf> {
        let destination = if tokio::fs::metadata(target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            target.join(&self.name)
        } else {
            target.to_path_buf()
        };
        tokio::fs::write(&destination, &self.data)
            .await
            .map_err(|e| AppError::io(format!("Cannot write {}: {}", destination.display(), e)))?;
        Ok(destination)
    }
}

/// Coordinates SD-card operations.
///
/// Every operation takes the device lock first and is rejected without a
/// request when the lock is held. The lock is released before any follow-up
/// (tree reload, relinquish) runs.
#[derive(Debug)]
pub struct TransferController {
    /// HTTP transport.
    transport: Arc<dyn DeviceTransport>,
    /// Shared SD-card lock.
    lock: DeviceLock,
    /// Tree reloaded after uploads and deletes.
    tree: Arc<RemoteFileTree>,
    /// Published controller state.
    view: watch::Sender<TransferView>,
    /// Delete / relinquish timeout.
    command_timeout: Option<Duration>,
    /// Upload / download timeout.
    transfer_timeout: Option<Duration>,
}

impl TransferController {
    /// Creates a controller with the timeouts from `config`.
    pub fn new(
        transport: Arc<dyn DeviceTransport>,
        lock: DeviceLock,
        tree: Arc<RemoteFileTree>,
        config: &DeviceConfig,
    ) -> Self {
        let (view, _) = watch::channel(TransferView::default());
        Self {
            transport,
            lock,
            tree,
            view,
            command_timeout: config.command_timeout(),
            transfer_timeout: config.transfer_timeout(),
        }
    }

    /// Current controller state.
    pub fn view(&self) -> TransferView {
        self.view.borrow().clone()
    }

    /// Subscribe to controller state changes.
    pub fn subscribe(&self) -> watch::Receiver<TransferView> {
        self.view.subscribe()
    }

    fn begin(&self, with_progress: bool, disable_upload: bool) {
        self.view.send_modify(|v| {
            v.busy = true;
            v.upload_enabled = !disable_upload;
            v.progress_visible = with_progress;
            v.progress = TransferProgress::default();
        });
    }

    fn finish(&self) {
        self.view.send_replace(TransferView::default());
    }

    fn report_progress(&self, progress: TransferProgress) {
        if progress.is_computable() {
            self.view.send_modify(|v| v.progress = progress);
        }
    }

    /// Upload `file` to `/<name>` and reload the tree on success.
    pub async fn upload(&self, file: LocalFile) -> AppResult<()> {
        if file.name.trim().is_empty() {
            return Err(AppError::validation("Please choose a file first"));
        }

        let guard = self.lock.try_acquire("upload")?;
        self.begin(true, true);

        let content_type = mime_guess::from_path(&file.name)
            .first_or_octet_stream()
            .to_string();
        let upload = MultipartUpload {
            endpoint: Endpoint::Upload,
            field: UPLOAD_FIELD,
            file_name: normalize_path(&file.name),
            content_type,
            data: file.data,
            timeout: self.transfer_timeout,
        };
        let size = upload.data.len();
        info!("Uploading {} ({} bytes)", upload.file_name, size);

        let sink = |p: TransferProgress| self.report_progress(p);
        let result = self
            .transport
            .post_multipart(upload, &sink)
            .await
            .and_then(|reply| expect_ok(&reply));

        drop(guard);
        self.finish();

        match result {
            Ok(()) => {
                info!("Upload of {} finished", file.name);
                if let Err(e) = self.tree.reload().await {
                    warn!("Reload after upload failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                Err(e)
            }
        }
    }

    /// Download the file at `path`, then relinquish the card.
    pub async fn download(&self, path: &str) -> AppResult<DownloadedFile> {
        let path = normalize_path(path);
        let guard = self.lock.try_acquire("download")?;
        self.begin(true, false);
        info!("Downloading {}", path);

        let request = DeviceRequest::new(Endpoint::Download)
            .with_query("path", path.as_str())
            .with_timeout(self.transfer_timeout);
        let sink = |p: TransferProgress| self.report_progress(p);
        let result = self
            .transport
            .get_with_progress(request, &sink)
            .await
            .and_then(|reply| {
                if let Some(err) = parse_download_error(&reply.body) {
                    return Err(err);
                }
                expect_ok(&reply)?;
                Ok(reply.body)
            });

        drop(guard);
        self.finish();

        let data = result.inspect_err(|e| warn!("Download of {} failed: {}", path, e))?;
        info!("Download of {} finished ({} bytes)", path, data.len());

        if let Err(e) = self.relinquish().await {
            warn!("Relinquish after download failed: {}", e);
        }

        Ok(DownloadedFile {
            name: file_name(&path).to_string(),
            path,
            data,
        })
    }

    /// Delete the file at `path`, then reload the tree whatever the outcome.
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let path = normalize_path(path);
        let guard = self.lock.try_acquire("delete")?;
        self.begin(false, false);
        info!("Deleting {}", path);

        let request = DeviceRequest::new(Endpoint::Delete)
            .with_query("path", path.as_str())
            .with_timeout(self.command_timeout);
        let result = match self.transport.get(request).await {
            Ok(reply) => parse_delete(&reply),
            Err(e) => Err(e),
        };

        drop(guard);
        self.finish();

        match &result {
            Ok(()) => info!("Deleted {}", path),
            Err(e) => warn!("Delete of {} failed: {}", path, e),
        }
        if let Err(e) = self.tree.reload().await {
            warn!("Reload after delete failed: {}", e);
        }
        result
    }

    /// Legacy generic write of `file` through `/edit`. The tree is not
    /// reloaded.
    pub async fn edit(&self, file: LocalFile) -> AppResult<()> {
        if file.name.trim().is_empty() {
            return Err(AppError::validation("Please choose a file first"));
        }

        let guard = self.lock.try_acquire("edit")?;
        self.begin(false, false);

        let upload = MultipartUpload {
            endpoint: Endpoint::Edit,
            field: UPLOAD_FIELD,
            content_type: mime_guess::from_path(&file.name)
                .first_or_octet_stream()
                .to_string(),
            file_name: normalize_path(&file.name),
            data: file.data,
            timeout: self.transfer_timeout,
        };
        info!("Writing {} through /edit", upload.file_name);

        let result = self
            .transport
            .post_multipart(upload, &NoProgress)
            .await
            .and_then(|reply| expect_ok(&reply));

        drop(guard);
        self.finish();

        if let Err(e) = &result {
            warn!("Write of {} failed: {}", file.name, e);
        }
        result
    }

    /// Tell the device this client is done with the card.
    pub async fn relinquish(&self) -> AppResult<()> {
        let request =
            DeviceRequest::new(Endpoint::Relinquish).with_timeout(self.command_timeout);
        let reply = self.transport.get(request).await?;
        expect_ok(&reply)
    }
}

fn expect_ok(reply: &DeviceReply) -> AppResult<()> {
    if reply.is_ok() {
        Ok(())
    } else {
        Err(AppError::transport(format!(
            "HTTP {}: {}",
            reply.status,
            preview(&reply.text(), 100)
        )))
    }
}
