//! Remote file nodes and the listing wire format.

use serde::{Deserialize, Serialize};

/// Path of the SD card root.
pub const ROOT_PATH: &str = "/";

/// Whether a node is a plain file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

/// One entry of a remote directory.
///
/// Identity is the normalized `path`, unique within a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Display name.
    pub name: String,
    /// Absolute path on the SD card, always starting with `/`.
    pub path: String,
    /// File or directory.
    pub kind: NodeKind,
    /// Size in bytes; only meaningful for files.
    pub size: Option<u64>,
}

impl FileNode {
    /// Create a file node.
    pub fn file(name: impl Into<String>, path: &str, size: u64) -> Self {
        Self {
            name: name.into(),
            path: normalize_path(path),
            kind: NodeKind::File,
            size: Some(size),
        }
    }

    /// Create a directory node.
    pub fn directory(name: impl Into<String>, path: &str) -> Self {
        Self {
            name: name.into(),
            path: normalize_path(path),
            kind: NodeKind::Directory,
            size: None,
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Listing item exactly as the device serializes it:
/// `{ "name": ..., "path"?: ..., "type": "dir" | other, "size"?: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    /// Entry name.
    pub name: String,
    /// Entry path; falls back to `name` when absent.
    #[serde(default)]
    pub path: Option<String>,
    /// `"dir"` for directories, anything else for files.
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// File size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

impl ListingItem {
    /// Convert into a node, resolving a missing path against the listed
    /// directory.
    pub fn into_node(self, listed_dir: &str) -> FileNode {
        let path = match self.path.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => normalize_path(p),
            _ => join_path(listed_dir, &self.name),
        };
        let kind = if self.item_type == "dir" {
            NodeKind::Directory
        } else {
            NodeKind::File
        };
        let size = match kind {
            NodeKind::File => Some(self.size.unwrap_or(0)),
            NodeKind::Directory => None,
        };

        FileNode {
            name: self.name,
            path,
            kind,
            size,
        }
    }
}

/// Normalize a remote path: exactly one leading `/`, no trailing `/`
/// except for the root itself.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        ROOT_PATH.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Join a directory path and an entry name.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = normalize_path(dir);
    let name = name.trim().trim_matches('/');
    if dir == ROOT_PATH {
        normalize_path(name)
    } else {
        format!("{dir}/{name}")
    }
}

/// Last segment of a remote path, used as the local file name on download.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
