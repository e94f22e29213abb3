//! Bounded buffers for document loading and value staging
//!
//! ## DocumentBuffer
//!
//! Holds one fully-read document. Capacity is fixed at construction and a
//! document larger than the capacity is rejected before any byte is kept:
//! the loader never works on a truncated document.
//!
//! ## StagingBuffer
//!
//! Capped scratch space for string values on their way into a table slot.
//! A value is accepted only when it leaves room for a terminator, so a slot
//! of `capacity` bytes holds at most `capacity - 1` bytes of text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::error::{ScanError, ScanResult};
use crate::parser::{Document, ScanLimits};

/// Fixed-capacity buffer holding one complete document
#[derive(Debug, Clone)]
pub struct DocumentBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl DocumentBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the contents with the whole file at `path`
    ///
    /// Returns the number of bytes read. On any error the buffer is left
    /// empty.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> ScanResult<usize> {
        let path = path.as_ref();
        self.data.clear();

        let io_err = |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();
        if size > self.capacity as u64 {
            return Err(ScanError::DocumentTooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                capacity: self.capacity,
            });
        }

        // One byte of headroom detects a file that grew after the stat.
        let limit = self.capacity as u64 + 1;
        if let Err(source) = file.take(limit).read_to_end(&mut self.data) {
            self.data.clear();
            return Err(io_err(source));
        }
        self.check_ceiling()?;

        Ok(self.data.len())
    }

    /// Replace the contents with `bytes`
    pub fn fill_from_slice(&mut self, bytes: &[u8]) -> ScanResult<usize> {
        self.data.clear();
        if bytes.len() > self.capacity {
            return Err(ScanError::DocumentTooLarge {
                size: bytes.len(),
                capacity: self.capacity,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(self.data.len())
    }

    fn check_ceiling(&mut self) -> ScanResult<()> {
        if self.data.len() > self.capacity {
            let size = self.data.len();
            self.data.clear();
            return Err(ScanError::DocumentTooLarge {
                size,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Validate the current contents and borrow them as a searchable document
    pub fn document(&self, limits: ScanLimits) -> ScanResult<Document<'_>> {
        Document::parse(&self.data, limits)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop the contents, keeping the allocation for the next load
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Value does not leave room for a terminator in the destination
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("value of {len} bytes does not fit capacity {capacity}")]
pub struct CapacityExceeded {
    pub len: usize,
    pub capacity: usize,
}

/// Capped scratch buffer for string values
#[derive(Debug, Clone)]
pub struct StagingBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl StagingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Copy `raw` verbatim; requires `raw.len() < capacity`
    pub fn stage(&mut self, raw: &[u8]) -> Result<(), CapacityExceeded> {
        self.bytes.clear();
        if raw.len() >= self.capacity {
            return Err(CapacityExceeded {
                len: raw.len(),
                capacity: self.capacity,
            });
        }
        self.bytes.extend_from_slice(raw);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the staged bytes as an owned string
    ///
    /// Values come from a validated UTF-8 document and are cut at ASCII
    /// quote boundaries, so lossy conversion never replaces anything there.
    pub fn take_string(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.bytes).into_owned();
        self.bytes.clear();
        text
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fill_from_slice_within_capacity() {
        let mut buf = DocumentBuffer::with_capacity(16);
        assert_eq!(buf.fill_from_slice(b"{\"a\":1}").unwrap(), 7);
        assert_eq!(buf.as_bytes(), b"{\"a\":1}");
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_fill_from_slice_rejects_oversize() {
        let mut buf = DocumentBuffer::with_capacity(4);
        let err = buf.fill_from_slice(b"{\"a\":1}").unwrap_err();
        assert!(matches!(
            err,
            ScanError::DocumentTooLarge { size: 7, capacity: 4 }
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_file_exact_capacity() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1,2]").unwrap();

        let mut buf = DocumentBuffer::with_capacity(5);
        assert_eq!(buf.read_file(file.path()).unwrap(), 5);
        assert_eq!(buf.as_bytes(), b"[1,2]");
    }

    #[test]
    fn test_read_file_too_large_keeps_nothing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1,2,3]").unwrap();

        let mut buf = DocumentBuffer::with_capacity(6);
        buf.fill_from_slice(b"{}").unwrap();

        let err = buf.read_file(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::DocumentTooLarge { size: 7, .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut buf = DocumentBuffer::with_capacity(8);
        let err = buf.read_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
        assert_eq!(err.status(), "ReadError");
    }

    #[test]
    fn test_staging_requires_room_for_terminator() {
        let mut staging = StagingBuffer::new(4);
        assert_eq!(
            staging.stage(b"abcd"),
            Err(CapacityExceeded { len: 4, capacity: 4 })
        );
        assert!(staging.as_bytes().is_empty());

        staging.stage(b"abc").unwrap();
        assert_eq!(staging.take_string(), "abc");
        assert!(staging.as_bytes().is_empty());
    }
}
