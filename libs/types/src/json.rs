//! JSON value kinds reported by the key search

use std::fmt;

/// Kind of a JSON value discovered in a document
///
/// Closed set: rendering and dispatch use exhaustive matches so a new kind
/// cannot be added without every consumer being revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum JsonType {
    String = 1,
    Number = 2,
    True = 3,
    False = 4,
    Null = 5,
    Object = 6,
    Array = 7,
}

impl JsonType {
    /// Human-readable name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            JsonType::String => "String",
            JsonType::Number => "Number",
            JsonType::True => "True",
            JsonType::False => "False",
            JsonType::Null => "Null",
            JsonType::Object => "Object",
            JsonType::Array => "Array",
        }
    }

    /// Classify a value by its first byte
    ///
    /// Returns `None` for bytes that cannot start a JSON value.
    pub const fn from_lead_byte(byte: u8) -> Option<Self> {
        match byte {
            b'"' => Some(JsonType::String),
            b'-' | b'0'..=b'9' => Some(JsonType::Number),
            b't' => Some(JsonType::True),
            b'f' => Some(JsonType::False),
            b'n' => Some(JsonType::Null),
            b'{' => Some(JsonType::Object),
            b'[' => Some(JsonType::Array),
            _ => None,
        }
    }

    pub const fn is_container(self) -> bool {
        matches!(self, JsonType::Object | JsonType::Array)
    }

    /// Scalars that can be bound into a table slot
    pub const fn is_bindable(self) -> bool {
        matches!(self, JsonType::String | JsonType::Number)
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_byte_classification() {
        assert_eq!(JsonType::from_lead_byte(b'"'), Some(JsonType::String));
        assert_eq!(JsonType::from_lead_byte(b'-'), Some(JsonType::Number));
        assert_eq!(JsonType::from_lead_byte(b'7'), Some(JsonType::Number));
        assert_eq!(JsonType::from_lead_byte(b't'), Some(JsonType::True));
        assert_eq!(JsonType::from_lead_byte(b'f'), Some(JsonType::False));
        assert_eq!(JsonType::from_lead_byte(b'n'), Some(JsonType::Null));
        assert_eq!(JsonType::from_lead_byte(b'{'), Some(JsonType::Object));
        assert_eq!(JsonType::from_lead_byte(b'['), Some(JsonType::Array));
        assert_eq!(JsonType::from_lead_byte(b'+'), None);
        assert_eq!(JsonType::from_lead_byte(b'}'), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(JsonType::Number.to_string(), "Number");
        assert_eq!(JsonType::Object.name(), "Object");
        assert!(JsonType::Array.is_container());
        assert!(!JsonType::Null.is_bindable());
        assert!(JsonType::String.is_bindable());
    }
}
