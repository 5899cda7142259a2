//! Unified application error types for SD Bridge.
//!
//! Every layer maps its failures into [`AppError`] so that call sites can
//! turn any failure into a user-facing notice with a single `match` on
//! [`ErrorKind`].

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The SD card is in use, either reported by the device (`SDBUSY`) or
    /// detected locally because the device lock is held.
    DeviceBusy,
    /// The device rejected the request arguments (`BADARGS`, `BADPATH`, `NOTDIR`).
    InvalidRequest,
    /// The request did not complete within its timeout.
    Timeout,
    /// Connection failure or a non-success status without a recognizable tag.
    Transport,
    /// The response body could not be understood.
    Parse,
    /// Input validation failed before anything was sent.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A local file could not be read or written.
    Io,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceBusy => write!(f, "DEVICE_BUSY"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Parse => write!(f, "PARSE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Io => write!(f, "IO"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout SD Bridge.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a device-busy error.
    pub fn device_busy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeviceBusy, message)
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a local I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Parse, format!("JSON parse error: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}
