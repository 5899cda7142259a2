//! Mapping of `reqwest` failures into [`AppError`].

use sdbridge_core::error::{AppError, ErrorKind};

/// Classify a `reqwest` error as a timeout or a generic transport failure.
pub fn map_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::with_source(ErrorKind::Timeout, format!("Request timed out: {err}"), err)
    } else if err.is_connect() {
        AppError::with_source(
            ErrorKind::Transport,
            format!("Connection failed: {err}"),
            err,
        )
    } else {
        AppError::with_source(ErrorKind::Transport, format!("Request failed: {err}"), err)
    }
}
