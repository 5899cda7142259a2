//! Remote file tree service: issues listing requests and applies them to
//! the shared [`FileTree`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use sdbridge_core::result::AppResult;
use sdbridge_core::traits::{DeviceRequest, DeviceTransport};
use sdbridge_core::types::Endpoint;
use sdbridge_entity::node::{FileNode, ROOT_PATH, normalize_path};
use sdbridge_entity::protocol::parse_listing;

use super::state::{FileTree, ToggleStep};
use super::view::{TreeRow, render};
use crate::lock::DeviceLock;

/// Result of [`RemoteFileTree::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The folder was listed and now shows this many children.
    Fetched(usize),
    /// A loaded folder was shown again.
    Expanded,
    /// The folder was hidden.
    Collapsed,
    /// A listing for this folder is still in flight.
    AlreadyLoading,
    /// The listing arrived after a full reload removed the folder.
    Discarded,
}

/// Lazily expanded view of the SD card contents.
#[derive(Debug)]
pub struct RemoteFileTree {
    transport: Arc<dyn DeviceTransport>,
    lock: DeviceLock,
    list_timeout: Duration,
    state: RwLock<FileTree>,
}

impl RemoteFileTree {
    /// Creates an unloaded tree.
    pub fn new(transport: Arc<dyn DeviceTransport>, lock: DeviceLock, list_timeout: Duration) -> Self {
        Self {
            transport,
            lock,
            list_timeout,
            state: RwLock::new(FileTree::new()),
        }
    }

    /// List one directory without touching the tree.
    pub async fn list_directory(&self, path: &str) -> AppResult<Vec<FileNode>> {
        let path = normalize_path(path);
        tracing::debug!("Loading folder: {}", path);

        let request = DeviceRequest::new(Endpoint::List)
            .with_query("dir", path.as_str())
            .with_timeout(Some(self.list_timeout));
        let reply = self.transport.get(request).await?;

        match parse_listing(&reply, &path) {
            Ok(nodes) => {
                tracing::debug!("Folder {} has {} entries", path, nodes.len());
                Ok(nodes)
            }
            Err(err) => {
                tracing::warn!("Listing {} failed: {}", path, err);
                Err(err)
            }
        }
    }

    /// Discard everything and list the root again.
    ///
    /// Holds the device lock for the duration of the request. Returns the
    /// number of root entries.
    pub async fn reload(&self) -> AppResult<usize> {
        let _guard = self.lock.try_acquire("list")?;
        self.state.write().await.begin_reload();

        let result = self.list_directory(ROOT_PATH).await;
        let outcome = result.as_ref().map(Vec::len).map_err(Clone::clone);
        self.state.write().await.finish_reload(result);

        if let Ok(count) = outcome {
            tracing::info!("File list loaded: {} root entries", count);
        }
        outcome
    }

    /// Toggle a folder, listing it on first expansion.
    ///
    /// Folder listings do not take the device lock.
    pub async fn toggle(&self, path: &str) -> AppResult<ToggleOutcome> {
        let step = self.state.write().await.toggle(path)?;
        match step {
            ToggleStep::Expanded => Ok(ToggleOutcome::Expanded),
            ToggleStep::Collapsed => Ok(ToggleOutcome::Collapsed),
            ToggleStep::AlreadyLoading => Ok(ToggleOutcome::AlreadyLoading),
            ToggleStep::Fetch => {
                let result = self.list_directory(path).await;
                let failure = result.as_ref().err().cloned();

                let mut state = self.state.write().await;
                if !state.apply_listing(path, result) {
                    tracing::debug!("Dropping listing for {}: no longer in the tree", path);
                    return Ok(ToggleOutcome::Discarded);
                }
                match failure {
                    Some(err) => Err(err),
                    None => Ok(ToggleOutcome::Fetched(
                        state.children(path).map_or(0, |c| c.len()),
                    )),
                }
            }
        }
    }

    /// Expand every visible unloaded folder, level by level, down to
    /// `depth` levels below the root. Failed folders keep their inline
    /// error. Returns the number of folders fetched.
    pub async fn expand_to_depth(&self, depth: usize) -> usize {
        let mut fetched = 0;
        for level in 0..depth {
            let pending = self.state.read().await.unloaded_dirs_at_depth(level);
            for path in pending {
                match self.toggle(&path).await {
                    Ok(ToggleOutcome::Fetched(_)) => fetched += 1,
                    Ok(_) => {}
                    Err(err) => tracing::warn!("Could not expand {}: {}", path, err),
                }
            }
        }
        fetched
    }

    /// Rendered rows of the current state.
    pub async fn rows(&self) -> Vec<TreeRow> {
        render(&*self.state.read().await)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> FileTree {
        self.state.read().await.clone()
    }

    /// Node at `path`, if known.
    pub async fn node(&self, path: &str) -> Option<FileNode> {
        self.state.read().await.node(path).cloned()
    }
}
