//! Result type alias
//!
//! This module provides a convenient Result type alias used throughout drain.

use crate::domain::errors::DrainError;

/// Result type alias using [`DrainError`] as the error type
pub type Result<T> = std::result::Result<T, DrainError>;
