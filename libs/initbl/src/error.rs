//! Table construction, access and registry errors

use std::path::PathBuf;

use codec::ScanError;
use thiserror::Error;
use types::ParamType;

/// Errors raised while building or loading a configuration table
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Enumeration declares more parameters than the table holds
    #[error("Enumeration declares {count} parameters but the table holds at most {max}")]
    TooManyParameters { count: usize, max: usize },

    /// Parameter type tag is neither "int" nor "str"
    #[error("Parameter {id} ('{name}') has unknown type tag '{tag}'")]
    UnknownParameterType { id: u16, name: String, tag: String },

    /// Enumeration has no name for an id inside its range
    #[error("Parameter {id} has no name")]
    UnnamedParameter { id: u16 },

    /// Prefix plus parameter name does not fit a query key
    #[error("Query key for '{name}' is {len} bytes (maximum {max})")]
    KeyTooLong { name: String, len: usize, max: usize },

    /// Document could not be read or validated
    #[error("Document error: {0}")]
    Document(#[from] ScanError),

    /// Document was valid but did not supply every parameter
    #[error("Loaded {loaded} of {expected} parameters")]
    IncompleteLoad { loaded: usize, expected: usize },

    /// Table settings are unusable
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// Writing a dump file failed
    #[error("Failed to dump table to {path}: {source}")]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why an accessor could not return a value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Id is not strictly between the enumeration sentinels
    #[error("Parameter id {id} outside ({start}, {end})")]
    OutOfRange { id: u16, start: u16, end: u16 },

    /// Parameter was not bound by the most recent load
    #[error("Parameter {id} ('{key}') has not been loaded")]
    NotYetLoaded { id: u16, key: String },

    /// Accessor does not match the declared parameter type
    #[error("Parameter {id} ('{key}') is {declared}, not {requested}")]
    TypeMismatch {
        id: u16,
        key: String,
        declared: ParamType,
        requested: ParamType,
    },
}

/// Failures of a table's load or dump command
#[derive(Debug, Error)]
pub enum TableError {
    /// Load type is not supported by this table kind
    #[error("Load type {0} is not supported")]
    UnsupportedLoadType(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Registry bookkeeping errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Every table slot is taken
    #[error("Registry full: {max} tables already registered")]
    Full { max: usize },

    /// Id does not name a registered table
    #[error("Table id {0} is not registered")]
    UnknownTable(usize),
}

/// Result type for table construction and loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
