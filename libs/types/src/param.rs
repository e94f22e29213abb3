//! Configuration parameter scalar kinds

use std::fmt;

use crate::json::JsonType;
use crate::limits::INT_SLOT_BYTES;

/// Tag a parameter enumeration uses for integer parameters
pub const PARAM_TYPE_INT: &str = "int";

/// Tag a parameter enumeration uses for string parameters
pub const PARAM_TYPE_STR: &str = "str";

/// Declared type of a configuration parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "lowercase"))]
pub enum ParamType {
    Int,
    Str,
}

impl ParamType {
    /// Parse an enumeration type tag; tags are case-sensitive
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            PARAM_TYPE_INT => Some(ParamType::Int),
            PARAM_TYPE_STR => Some(ParamType::Str),
            _ => None,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            ParamType::Int => PARAM_TYPE_INT,
            ParamType::Str => PARAM_TYPE_STR,
        }
    }

    /// JSON kind a document value must have to bind to this parameter
    pub const fn json_type(self) -> JsonType {
        match self {
            ParamType::Int => JsonType::Number,
            ParamType::Str => JsonType::String,
        }
    }

    /// Destination capacity in bytes, given the table's string slot width
    pub const fn slot_capacity(self, max_str_len: usize) -> usize {
        match self {
            ParamType::Int => INT_SLOT_BYTES,
            ParamType::Str => max_str_len,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}
