//! Lazily expanded mirror of the remote directory structure.
//!
//! [`FileTree`] is pure state: it never performs I/O. Network round-trips
//! are split into a "begin" step that says whether a request is needed and
//! an "apply" step that feeds the response back in, which keeps every state
//! transition testable without a device.

use std::collections::HashMap;

use sdbridge_core::error::AppError;
use sdbridge_core::result::AppResult;
use sdbridge_entity::node::{FileNode, ROOT_PATH, normalize_path};

/// View state of one visited directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirViewState {
    /// Children are shown.
    pub expanded: bool,
    /// Children have been fetched; never reverts without a full reload.
    pub loaded: bool,
    /// A listing request is in flight.
    pub loading: bool,
    /// Inline error from the last failed listing.
    pub error: Option<String>,
}

/// State of the root listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootState {
    /// Nothing requested yet.
    #[default]
    Unloaded,
    /// Root listing in flight.
    Loading,
    /// Root children are known.
    Loaded,
    /// Root listing failed.
    Failed(String),
}

/// What a toggle on a directory requires from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    /// The directory entered `Loading`; its listing must be requested and
    /// passed to [`FileTree::apply_listing`].
    Fetch,
    /// A loaded directory was shown again without a request.
    Expanded,
    /// The directory was hidden; children are retained.
    Collapsed,
    /// A request for this directory is already in flight.
    AlreadyLoading,
}

/// In-memory tree keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    /// Every known node.
    nodes: HashMap<String, FileNode>,
    /// Fetched child lists, in device order; the root list is under `/`.
    children: HashMap<String, Vec<String>>,
    /// View state of visited directories.
    dirs: HashMap<String, DirViewState>,
    /// Root listing state.
    root: RootState,
}

impl FileTree {
    /// Creates an empty, unloaded tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every cached node and view state and marks the root as
    /// loading.
    pub fn begin_reload(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.dirs.clear();
        self.root = RootState::Loading;
    }

    /// Completes a root listing started with [`begin_reload`](Self::begin_reload).
    pub fn finish_reload(&mut self, result: AppResult<Vec<FileNode>>) {
        match result {
            Ok(nodes) => {
                self.insert_children(ROOT_PATH, nodes);
                self.root = RootState::Loaded;
            }
            Err(err) => {
                self.root = RootState::Failed(err.message);
            }
        }
    }

    /// Toggles directory `path`.
    pub fn toggle(&mut self, path: &str) -> AppResult<ToggleStep> {
        let path = normalize_path(path);
        match self.nodes.get(&path) {
            Some(node) if node.is_dir() => {}
            Some(_) => {
                return Err(AppError::validation(format!("Not a directory: {path}")));
            }
            None => {
                return Err(AppError::validation(format!("Not in the file tree: {path}")));
            }
        }

        let state = self.dirs.entry(path).or_default();
        let step = if state.loading {
            ToggleStep::AlreadyLoading
        } else if state.loaded {
            state.expanded = !state.expanded;
            if state.expanded {
                ToggleStep::Expanded
            } else {
                ToggleStep::Collapsed
            }
        } else {
            state.loading = true;
            state.expanded = true;
            state.error = None;
            ToggleStep::Fetch
        };
        Ok(step)
    }

    /// Feeds the listing of directory `path` back into the tree.
    ///
    /// Returns `false` when the directory is no longer part of the tree
    /// (a full reload ran meanwhile); the response is then dropped.
    pub fn apply_listing(&mut self, path: &str, result: AppResult<Vec<FileNode>>) -> bool {
        let path = normalize_path(path);
        if !self.nodes.get(&path).is_some_and(FileNode::is_dir) {
            return false;
        }

        match result {
            Ok(nodes) => {
                self.insert_children(&path, nodes);
                let state = self.dirs.entry(path).or_default();
                state.loading = false;
                state.loaded = true;
                state.expanded = true;
                state.error = None;
            }
            Err(err) => {
                let state = self.dirs.entry(path).or_default();
                state.loading = false;
                state.expanded = false;
                state.error = Some(err.message);
            }
        }
        true
    }

    fn insert_children(&mut self, parent: &str, nodes: Vec<FileNode>) {
        let mut paths = Vec::with_capacity(nodes.len());
        for node in nodes {
            if is_self_or_ancestor(&node.path, parent) {
                tracing::warn!(
                    "Ignoring entry {} in listing of {}: it points back up the tree",
                    node.path,
                    parent
                );
                continue;
            }
            paths.push(node.path.clone());
            self.nodes.insert(node.path.clone(), node);
        }
        self.children.insert(parent.to_string(), paths);
    }

    /// Root listing state.
    pub fn root_state(&self) -> &RootState {
        &self.root
    }

    /// Node at `path`, if known.
    pub fn node(&self, path: &str) -> Option<&FileNode> {
        self.nodes.get(&normalize_path(path))
    }

    /// Fetched children of `path` in device order; `None` if not fetched.
    pub fn children(&self, path: &str) -> Option<Vec<&FileNode>> {
        self.children
            .get(&normalize_path(path))
            .map(|paths| paths.iter().filter_map(|p| self.nodes.get(p)).collect())
    }

    /// View state of directory `path`, if it was ever toggled.
    pub fn dir_state(&self, path: &str) -> Option<&DirViewState> {
        self.dirs.get(&normalize_path(path))
    }

    /// Number of known nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is known.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Directories that are visible (all ancestors expanded), not yet
    /// loaded, and at `depth` levels below the root (root children are 0).
    pub fn unloaded_dirs_at_depth(&self, depth: usize) -> Vec<String> {
        let mut level: Vec<&str> = self
            .children
            .get(ROOT_PATH)
            .map(|c| c.iter().map(String::as_str).collect())
            .unwrap_or_default();

        for _ in 0..depth {
            level = level
                .into_iter()
                .filter(|p| self.dirs.get(*p).is_some_and(|s| s.expanded && s.loaded))
                .filter_map(|p| self.children.get(p))
                .flat_map(|c| c.iter().map(String::as_str))
                .collect();
        }

        level
            .into_iter()
            .filter(|p| self.nodes.get(*p).is_some_and(FileNode::is_dir))
            .filter(|p| !self.dirs.get(*p).is_some_and(|s| s.loaded || s.loading))
            .map(str::to_string)
            .collect()
    }
}

/// Whether `path` is `dir` itself or one of its ancestors.
fn is_self_or_ancestor(path: &str, dir: &str) -> bool {
    path == ROOT_PATH
        || path == dir
        || dir
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}
