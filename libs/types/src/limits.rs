//! Platform limits for document loading and table sizing
//!
//! These are compile-time ceilings. Runtime settings may choose lower values
//! but never higher ones: inline storage such as query keys is sized from
//! them.

/// Maximum query key length in bytes (namespace prefix included)
pub const MAX_KEY_LEN: usize = 64;

/// Maximum number of parameters in one configuration table
pub const MAX_CFG_ITEMS: usize = 32;

/// String slot width in bytes, terminator included
///
/// A string value must be strictly shorter than this to be stored.
pub const MAX_CFG_STR_LEN: usize = 64;

/// Largest document a table will read
pub const MAX_DOCUMENT_BYTES: usize = 8192;

/// Maximum container nesting accepted by the validator
pub const MAX_JSON_DEPTH: usize = 32;

/// Maximum number of tables a registry manages
pub const MAX_TABLES: usize = 5;

/// Width of an integer slot in bytes
pub const INT_SLOT_BYTES: usize = std::mem::size_of::<i32>();

/// Namespace prepended to every configuration parameter name
pub const CONFIG_KEY_PREFIX: &str = "config.";

/// Bytes per line when logging a container value for inspection
pub const INSPECT_SEGMENT_BYTES: usize = 100;
