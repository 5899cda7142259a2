//! User-facing notices.
//!
//! Every failure is caught where the request was issued and turned into a
//! [`Notice`] for the UI adapter to show; none of them abort the program.

use std::fmt;

use serde::Serialize;

use sdbridge_core::error::{AppError, ErrorKind};

/// The user action a notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Root listing (refresh).
    List,
    /// Listing of a sub-folder on expansion.
    Expand,
    /// File upload.
    Upload,
    /// File download.
    Download,
    /// File deletion.
    Delete,
    /// Legacy generic write.
    Edit,
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// The action completed.
    Success,
    /// The device or the local lock refused the action.
    Warning,
    /// The action failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// The success notice for `operation`.
    pub fn done(operation: Operation) -> Self {
        let message = match operation {
            Operation::List => "File list loaded",
            Operation::Expand => "Folder loaded",
            Operation::Upload => "Upload done!",
            Operation::Download => "Download done!",
            Operation::Delete => "File deleted",
            Operation::Edit => "Write done!",
        };
        Self::success(message)
    }

    /// The notice for a failed `operation`.
    ///
    /// Local lock contention and a device `SDBUSY` reply read the same.
    pub fn from_error(operation: Operation, err: &AppError) -> Self {
        let (level, message) = match err.kind {
            ErrorKind::DeviceBusy => (
                NoticeLevel::Warning,
                "Printer is busy, wait for 10s and try again".to_string(),
            ),
            ErrorKind::InvalidRequest => (
                NoticeLevel::Warning,
                "Bad args, please try again or reset the module".to_string(),
            ),
            ErrorKind::Timeout => (
                NoticeLevel::Error,
                "Request timeout - SD card may be busy".to_string(),
            ),
            ErrorKind::Transport => (NoticeLevel::Error, transport_message(operation).to_string()),
            ErrorKind::Parse => (NoticeLevel::Error, "Error parsing response".to_string()),
            ErrorKind::Validation
            | ErrorKind::Configuration
            | ErrorKind::Io
            | ErrorKind::Internal => (NoticeLevel::Error, err.message.clone()),
        };
        Self { level, message }
    }
}

fn transport_message(operation: Operation) -> &'static str {
    match operation {
        Operation::List => "Error loading file list",
        Operation::Expand => "Connection error",
        Operation::Upload => "Upload failed!",
        Operation::Download => "Download failed!",
        Operation::Delete => "Delete failed!",
        Operation::Edit => "Write failed!",
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
