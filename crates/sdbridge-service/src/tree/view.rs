//! Pure rendering of a [`FileTree`] into display rows.

use serde::Serialize;

use sdbridge_entity::node::{FileNode, NodeKind, ROOT_PATH};

use super::state::{FileTree, RootState};
use crate::format::nice_bytes;

/// Horizontal indentation per nesting level.
pub const INDENT_PER_LEVEL: usize = 20;

/// Expand affordance of a directory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleGlyph {
    /// Collapsed.
    Collapsed,
    /// Expanded.
    Expanded,
}

impl ToggleGlyph {
    /// The glyph drawn next to the folder name.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Collapsed => "▶",
            Self::Expanded => "▼",
        }
    }
}

/// Per-file action, keyed by the row's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Delete,
    Download,
}

/// A file or directory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub depth: usize,
    pub indent: usize,
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    /// Human-readable size for files, `"Folder"` for directories.
    pub size_label: String,
    /// Present for directories only.
    pub toggle: Option<ToggleGlyph>,
    /// Present for files only.
    pub actions: Vec<RowAction>,
}

/// Non-node rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "placeholder", content = "message")]
pub enum Placeholder {
    Loading,
    EmptyFolder,
    NoFiles,
    Error(String),
}

impl Placeholder {
    /// Text of the placeholder.
    pub fn text(&self) -> String {
        match self {
            Self::Loading => "Loading...".to_string(),
            Self::EmptyFolder => "Empty folder".to_string(),
            Self::NoFiles => "No files found on SD card".to_string(),
            Self::Error(message) => format!("Error: {message}"),
        }
    }
}

/// One rendered line of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "row")]
pub enum TreeRow {
    Node(NodeRow),
    Placeholder {
        depth: usize,
        indent: usize,
        placeholder: Placeholder,
    },
}

impl TreeRow {
    fn placeholder(depth: usize, placeholder: Placeholder) -> Self {
        Self::Placeholder {
            depth,
            indent: depth * INDENT_PER_LEVEL,
            placeholder,
        }
    }

    /// The node row, if this is one.
    pub fn as_node(&self) -> Option<&NodeRow> {
        match self {
            Self::Node(row) => Some(row),
            Self::Placeholder { .. } => None,
        }
    }

    /// Nesting depth; root children are at 0.
    pub fn depth(&self) -> usize {
        match self {
            Self::Node(row) => row.depth,
            Self::Placeholder { depth, .. } => *depth,
        }
    }
}

/// Render the visible part of `tree`, depth first, in device order.
pub fn render(tree: &FileTree) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    match tree.root_state() {
        RootState::Unloaded => {}
        RootState::Loading => rows.push(TreeRow::placeholder(0, Placeholder::Loading)),
        RootState::Failed(message) => {
            rows.push(TreeRow::placeholder(0, Placeholder::Error(message.clone())));
        }
        RootState::Loaded => match tree.children(ROOT_PATH) {
            Some(children) if !children.is_empty() => {
                let mut ancestors = vec![ROOT_PATH.to_string()];
                render_children(tree, &children, 0, &mut ancestors, &mut rows);
            }
            _ => rows.push(TreeRow::placeholder(0, Placeholder::NoFiles)),
        },
    }
    rows
}

/// `ancestors` holds the directories currently being rendered; a child that
/// repeats one of them is skipped.
fn render_children(
    tree: &FileTree,
    children: &[&FileNode],
    depth: usize,
    ancestors: &mut Vec<String>,
    rows: &mut Vec<TreeRow>,
) {
    for node in children {
        if ancestors.contains(&node.path) {
            continue;
        }
        if !node.is_dir() {
            rows.push(TreeRow::Node(NodeRow {
                depth,
                indent: depth * INDENT_PER_LEVEL,
                path: node.path.clone(),
                name: node.name.clone(),
                kind: NodeKind::File,
                size_label: nice_bytes(node.size.unwrap_or(0)),
                toggle: None,
                actions: vec![RowAction::Delete, RowAction::Download],
            }));
            continue;
        }

        let state = tree.dir_state(&node.path).cloned().unwrap_or_default();
        let glyph = if state.expanded {
            ToggleGlyph::Expanded
        } else {
            ToggleGlyph::Collapsed
        };
        rows.push(TreeRow::Node(NodeRow {
            depth,
            indent: depth * INDENT_PER_LEVEL,
            path: node.path.clone(),
            name: node.name.clone(),
            kind: NodeKind::Directory,
            size_label: "Folder".to_string(),
            toggle: Some(glyph),
            actions: Vec::new(),
        }));

        let child_depth = depth + 1;
        if state.loading {
            rows.push(TreeRow::placeholder(child_depth, Placeholder::Loading));
        } else if let Some(error) = state.error {
            rows.push(TreeRow::placeholder(child_depth, Placeholder::Error(error)));
        } else if state.expanded {
            match tree.children(&node.path) {
                Some(grandchildren) if !grandchildren.is_empty() => {
                    ancestors.push(node.path.clone());
                    render_children(tree, &grandchildren, child_depth, ancestors, rows);
                    ancestors.pop();
                }
                _ => rows.push(TreeRow::placeholder(child_depth, Placeholder::EmptyFolder)),
            }
        }
    }
}
