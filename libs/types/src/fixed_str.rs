//! Fixed-capacity UTF-8 string with inline storage
//!
//! Query keys are bounded at construction time so that a descriptor can never
//! carry a key longer than the platform allows. Storage is inline: building a
//! descriptor array does not allocate per key.

use std::fmt;

use crate::errors::FixedStrError;

/// Fixed-capacity UTF-8 string
///
/// Stores up to `N` bytes inline with an explicit length. Unused bytes are
/// zeroed so equality and hashing only depend on the valid prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    len: u16,
    data: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    /// Create new empty string
    pub const fn new() -> Self {
        Self { len: 0, data: [0; N] }
    }

    /// Create from string slice, rejecting input longer than `N`
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, FixedStrError> {
        let mut result = Self::new();
        result.push_str(s)?;
        Ok(result)
    }

    /// Concatenate two parts, failing if the combined length exceeds `N`
    pub fn concat(prefix: &str, suffix: &str) -> Result<Self, FixedStrError> {
        let total = prefix.len() + suffix.len();
        if total > N {
            return Err(FixedStrError::TooLong { max: N, got: total });
        }

        let mut result = Self::from_str(prefix)?;
        result.push_str(suffix)?;
        Ok(result)
    }

    /// Append a string slice
    pub fn push_str(&mut self, s: &str) -> Result<(), FixedStrError> {
        let start = self.len();
        let end = start + s.len();
        if end > N {
            return Err(FixedStrError::TooLong { max: N, got: end });
        }

        self.data[start..end].copy_from_slice(s.as_bytes());
        self.len = end as u16;
        Ok(())
    }

    /// Valid contents as a string slice
    pub fn as_str(&self) -> &str {
        // Only whole `&str` values are ever copied in, so the prefix is UTF-8.
        std::str::from_utf8(&self.data[..self.len()]).unwrap_or_default()
    }

    /// Valid contents as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum capacity in bytes
    pub const fn capacity() -> usize {
        N
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TryFrom<&str> for FixedStr<N> {
    type Error = FixedStrError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_str(s)
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> AsRef<str> for FixedStr<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
