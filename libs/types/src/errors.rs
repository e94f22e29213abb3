//! Error types for bounded type construction

use thiserror::Error;

/// Errors raised when building a [`FixedStr`](crate::FixedStr)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedStrError {
    /// Input does not fit in the inline storage
    #[error("String of {got} bytes exceeds capacity {max}")]
    TooLong { max: usize, got: usize },
}
