//! # sdbridge-core
//!
//! Core crate for SD Bridge. Contains the device transport trait, the
//! configuration schema, endpoint and progress types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other SD Bridge crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
