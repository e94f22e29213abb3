//! Document- and binding-level errors
//!
//! Each variant carries enough context (offsets, lengths, keys) to be logged
//! as a structured diagnostic without re-inspecting the document.

use std::path::PathBuf;

use thiserror::Error;
use types::JsonType;

/// Errors raised while reading, validating or searching a document
#[derive(Debug, Error)]
pub enum ScanError {
    /// Document does not fit in the buffer; nothing was read
    #[error("Document too large: {size} bytes exceeds buffer capacity {capacity}")]
    DocumentTooLarge { size: usize, capacity: usize },

    /// Document is not structurally valid JSON
    #[error("Malformed document at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    /// Containers nest deeper than the configured limit
    #[error("Maximum depth {max_depth} exceeded at byte {offset}")]
    DepthExceeded { max_depth: usize, offset: usize },

    /// Document is valid but contains no member with the query key
    #[error("Query key '{key}' not found")]
    KeyNotFound { key: String },

    /// Query key is empty or longer than the platform maximum
    #[error("Invalid query key of {len} bytes (maximum {max})")]
    KeyInvalid { len: usize, max: usize },

    /// Underlying file read failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::Malformed { offset, reason }
    }

    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Short status label, used as a structured diagnostic field
    pub fn status(&self) -> &'static str {
        match self {
            ScanError::DocumentTooLarge { .. } => "DocumentTooLarge",
            ScanError::Malformed { .. } => "Invalid-Malformed",
            ScanError::DepthExceeded { .. } => "MaxDepthExceeded",
            ScanError::KeyNotFound { .. } => "QueryKeyNotFound",
            ScanError::KeyInvalid { .. } => "QueryKeyInvalid",
            ScanError::Io { .. } => "ReadError",
        }
    }
}

/// Failure to convert number text into a 32-bit signed integer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No digits before the first non-digit
    #[error("number '{text}' has no leading digits")]
    NoDigits { text: String },

    /// Digits followed by text that is not a fraction or exponent
    #[error("number '{text}' has trailing characters")]
    TrailingCharacters { text: String },

    /// Integer part does not fit in i32
    #[error("number '{text}' is outside the 32-bit integer range")]
    OutOfRange { text: String },
}

/// Per-binding failures raised by the loader
#[derive(Debug, Error)]
pub enum BindError {
    /// Key lookup failed
    #[error(transparent)]
    Search(#[from] ScanError),

    /// String value does not fit in the destination with its terminator
    #[error("String of {len} bytes for '{key}' exceeds destination capacity {capacity}")]
    LengthExceeded {
        key: String,
        len: usize,
        capacity: usize,
    },

    /// Discovered value kind differs from the descriptor's expected kind
    #[error("Type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: JsonType,
        found: JsonType,
    },

    /// Number text could not be converted
    #[error("Conversion error for '{key}': {source}")]
    Conversion {
        key: String,
        #[source]
        source: ConversionError,
    },

    /// Object or array values are inspected but never bound
    #[error("'{key}' holds a {found} value which cannot be bound to a slot")]
    ContainerValue { key: String, found: JsonType },

    /// Descriptor refers to a slot the target does not have
    #[error("Destination {slot} for '{key}' does not exist")]
    MissingSlot { key: String, slot: usize },
}

/// Result type for scanning operations
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Result type for binding operations
pub type BindResult<T> = std::result::Result<T, BindError>;
