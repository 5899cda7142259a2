//! Convenience result type alias for SD Bridge.

use crate::error::AppError;

/// A specialized `Result` type for SD Bridge operations.
pub type AppResult<T> = Result<T, AppError>;
