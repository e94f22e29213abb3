//! Integer conversion for bound number values
//!
//! Table slots hold 32-bit signed integers. Conversion reads an optional sign
//! and a run of decimal digits; what follows decides the outcome:
//!
//! | remainder                      | result                          |
//! |--------------------------------|---------------------------------|
//! | nothing                        | [`IntegerParse::Exact`]         |
//! | JSON fraction and/or exponent  | [`IntegerParse::Truncated`]     |
//! | anything else                  | [`ConversionError`]             |
//!
//! Truncation keeps the leading integer digits only (`3.14` → 3, `1e3` → 1).
//! Callers must not rely on fractional precision; truncated results are
//! reported so they can be diagnosed.

use crate::error::ConversionError;

/// Outcome of a successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerParse {
    /// Text was a plain integer
    Exact(i32),
    /// Text had a fraction or exponent that was discarded
    Truncated(i32),
}

impl IntegerParse {
    pub const fn value(self) -> i32 {
        match self {
            IntegerParse::Exact(v) | IntegerParse::Truncated(v) => v,
        }
    }

    pub const fn is_exact(self) -> bool {
        matches!(self, IntegerParse::Exact(_))
    }
}

/// Convert number text to an `i32`
pub fn parse_integer(text: &[u8]) -> Result<IntegerParse, ConversionError> {
    let owned = || String::from_utf8_lossy(text).into_owned();

    let mut pos = 0;
    let negative = match text.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    let mut magnitude: i64 = 0;
    while let Some(&byte) = text.get(pos) {
        if !byte.is_ascii_digit() {
            break;
        }
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(i64::from(byte - b'0')))
            .ok_or_else(|| ConversionError::OutOfRange { text: owned() })?;
        // Anything past this cannot fit in i32 either way.
        if magnitude > i64::from(i32::MAX) + 1 {
            return Err(ConversionError::OutOfRange { text: owned() });
        }
        pos += 1;
    }

    if pos == digits_start {
        return Err(ConversionError::NoDigits { text: owned() });
    }

    let signed = if negative { -magnitude } else { magnitude };
    let value =
        i32::try_from(signed).map_err(|_| ConversionError::OutOfRange { text: owned() })?;

    let rest = &text[pos..];
    if rest.is_empty() {
        Ok(IntegerParse::Exact(value))
    } else if is_fraction_or_exponent(rest) {
        Ok(IntegerParse::Truncated(value))
    } else {
        Err(ConversionError::TrailingCharacters { text: owned() })
    }
}

/// `("." digits)? ([eE] [+-]? digits)?`, non-empty
fn is_fraction_or_exponent(rest: &[u8]) -> bool {
    let mut pos = 0;

    if rest.first() == Some(&b'.') {
        pos += 1;
        let start = pos;
        while rest.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if pos == start {
            return false;
        }
    }

    if matches!(rest.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(rest.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let start = pos;
        while rest.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if pos == start {
            return false;
        }
    }

    pos > 0 && pos == rest.len()
}
