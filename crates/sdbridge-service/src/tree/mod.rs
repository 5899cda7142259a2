//! Lazily expanded remote file tree.

pub mod browser;
pub mod state;
pub mod view;

pub use browser::{RemoteFileTree, ToggleOutcome};
pub use state::{DirViewState, FileTree, RootState, ToggleStep};
pub use view::{NodeRow, Placeholder, RowAction, ToggleGlyph, TreeRow, render};
