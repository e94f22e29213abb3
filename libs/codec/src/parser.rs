//! # JSON Document Validation and Key Search
//!
//! ## Purpose
//!
//! Locates the value of a member key inside a JSON document without building
//! an object tree. The scanner walks the raw bytes once with an explicit
//! container stack (no recursion), bounded by [`ScanLimits::max_depth`].
//!
//! ## Semantics
//!
//! - **Validation first**: [`Document::parse`] checks the whole buffer
//!   (UTF-8, JSON grammar, depth) before any search is possible. A
//!   [`Document`] value is proof that the buffer is valid.
//! - **First match wins**: the search returns the first member whose name
//!   equals the query key in document order, at any nesting depth. Later
//!   duplicates are never reported.
//! - **Raw comparison**: member names are compared byte-for-byte without
//!   unescaping, and string values are returned as the raw bytes between
//!   their quotes.
//! - **Zero-copy**: returned values borrow from the document buffer.
//!
//! ## Depth
//!
//! Depth counts open containers: `{"a":1}` has depth 1 and `{"a":[1]}` has
//! depth 2. Opening a container beyond the limit fails with
//! [`ScanError::DepthExceeded`], which is distinct from a missing key.

use types::{JsonType, MAX_JSON_DEPTH};

use crate::error::{ScanError, ScanResult};

/// Limits applied while validating and searching a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum number of simultaneously open containers
    pub max_depth: usize,
}

impl ScanLimits {
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_JSON_DEPTH,
        }
    }
}

/// A value located by the key search, borrowed from the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonValue<'a> {
    /// Raw value text; for strings, the bytes between the quotes
    pub bytes: &'a [u8],
    pub json_type: JsonType,
    /// Byte offset of `bytes` within the document
    pub offset: usize,
}

impl<'a> JsonValue<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw text of the value
    pub fn as_str(&self) -> &'a str {
        // Cut at ASCII delimiters of a UTF-8 validated document.
        std::str::from_utf8(self.bytes).unwrap_or_default()
    }
}

/// A validated document ready for key searches
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    bytes: &'a [u8],
    limits: ScanLimits,
}

impl<'a> Document<'a> {
    /// Validate `bytes` as a complete JSON document
    pub fn parse(bytes: &'a [u8], limits: ScanLimits) -> ScanResult<Self> {
        walk(bytes, limits, None)?;
        Ok(Self { bytes, limits })
    }

    /// Find the first member named `key` at any depth
    pub fn search(&self, key: &str) -> ScanResult<JsonValue<'a>> {
        if key.is_empty() || key.len() > types::MAX_KEY_LEN {
            return Err(ScanError::KeyInvalid {
                len: key.len(),
                max: types::MAX_KEY_LEN,
            });
        }

        walk(self.bytes, self.limits, Some(key.as_bytes()))?
            .ok_or_else(|| ScanError::key_not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.search(key).is_ok()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }
}

/// Validate `bytes` without searching
pub fn validate(bytes: &[u8], limits: ScanLimits) -> ScanResult<()> {
    walk(bytes, limits, None).map(|_| ())
}

/// Validate `bytes` then search for `key` using default limits
pub fn search<'a>(bytes: &'a [u8], key: &str) -> ScanResult<JsonValue<'a>> {
    search_with_limits(bytes, key, ScanLimits::default())
}

/// Validate `bytes` then search for `key`
pub fn search_with_limits<'a>(
    bytes: &'a [u8],
    key: &str,
    limits: ScanLimits,
) -> ScanResult<JsonValue<'a>> {
    Document::parse(bytes, limits)?.search(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

impl Container {
    const fn close(self) -> u8 {
        match self {
            Container::Object => b'}',
            Container::Array => b']',
        }
    }
}

/// Value whose member name matched the query
#[derive(Debug, Clone, Copy)]
struct Capture {
    start: usize,
    json_type: JsonType,
    depth: usize,
}

impl Capture {
    fn finish(self, buf: &[u8], end: usize) -> JsonValue<'_> {
        match self.json_type {
            JsonType::String => JsonValue {
                bytes: &buf[self.start + 1..end - 1],
                json_type: self.json_type,
                offset: self.start + 1,
            },
            _ => JsonValue {
                bytes: &buf[self.start..end],
                json_type: self.json_type,
                offset: self.start,
            },
        }
    }
}

/// Single pass over the document
///
/// With `query == None` this is pure validation and returns `Ok(None)` for a
/// valid document. With a query it returns as soon as the first matching
/// member's value has been fully scanned.
fn walk<'a>(
    buf: &'a [u8],
    limits: ScanLimits,
    query: Option<&[u8]>,
) -> ScanResult<Option<JsonValue<'a>>> {
    if let Err(e) = std::str::from_utf8(buf) {
        return Err(ScanError::malformed(e.valid_up_to(), "invalid UTF-8"));
    }

    let mut cur = Cursor::new(buf);
    let mut stack: Vec<Container> = Vec::with_capacity(limits.max_depth.min(MAX_JSON_DEPTH));
    let mut capture: Option<Capture> = None;
    let mut capture_next = false;

    cur.skip_ws();
    if cur.at_end() {
        return Err(ScanError::malformed(cur.pos, "empty document"));
    }

    'value: loop {
        // Positioned at the first byte of a value.
        let start = cur.pos;
        let lead = cur
            .peek()
            .ok_or_else(|| ScanError::malformed(start, "value expected"))?;
        let json_type = JsonType::from_lead_byte(lead)
            .ok_or_else(|| ScanError::malformed(start, "unexpected character"))?;

        if capture_next {
            capture = Some(Capture {
                start,
                json_type,
                depth: stack.len(),
            });
            capture_next = false;
        }

        match json_type {
            JsonType::Object | JsonType::Array => {
                if stack.len() >= limits.max_depth {
                    return Err(ScanError::DepthExceeded {
                        max_depth: limits.max_depth,
                        offset: start,
                    });
                }
                let container = if json_type == JsonType::Object {
                    Container::Object
                } else {
                    Container::Array
                };
                stack.push(container);
                cur.bump();
                cur.skip_ws();

                if cur.peek() == Some(container.close()) {
                    cur.bump();
                    stack.pop();
                } else {
                    if container == Container::Object {
                        let name = cur.member_name()?;
                        capture_next = capture.is_none() && query == Some(name);
                    }
                    continue 'value;
                }
            }
            JsonType::String => {
                cur.scan_string()?;
            }
            JsonType::Number => cur.scan_number()?,
            JsonType::True => cur.scan_literal(b"true")?,
            JsonType::False => cur.scan_literal(b"false")?,
            JsonType::Null => cur.scan_literal(b"null")?,
        }

        // Positioned just past a complete value.
        loop {
            if let Some(cap) = capture {
                if stack.len() == cap.depth {
                    return Ok(Some(cap.finish(buf, cur.pos)));
                }
            }

            cur.skip_ws();
            let Some(&container) = stack.last() else {
                if !cur.at_end() {
                    return Err(ScanError::malformed(
                        cur.pos,
                        "trailing characters after document",
                    ));
                }
                return Ok(None);
            };

            match cur.peek() {
                Some(b',') => {
                    cur.bump();
                    cur.skip_ws();
                    if container == Container::Object {
                        let name = cur.member_name()?;
                        capture_next = capture.is_none() && query == Some(name);
                    }
                    continue 'value;
                }
                Some(byte) if byte == container.close() => {
                    cur.bump();
                    stack.pop();
                }
                _ => {
                    let reason = match container {
                        Container::Object => "expected ',' or '}'",
                        Container::Array => "expected ',' or ']'",
                    };
                    return Err(ScanError::malformed(cur.pos, reason));
                }
            }
        }
    }
}

/// Byte cursor with JSON lexical helpers
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Scan `"name" :` and leave the cursor on the member value
    fn member_name(&mut self) -> ScanResult<&'a [u8]> {
        if self.peek() != Some(b'"') {
            return Err(ScanError::malformed(self.pos, "object key expected"));
        }
        let name = self.scan_string()?;
        self.skip_ws();
        if self.peek() != Some(b':') {
            return Err(ScanError::malformed(self.pos, "':' expected after object key"));
        }
        self.bump();
        self.skip_ws();
        Ok(name)
    }

    /// Scan a string starting at its opening quote; returns the raw content
    fn scan_string(&mut self) -> ScanResult<&'a [u8]> {
        let open = self.pos;
        self.bump();
        let start = self.pos;

        loop {
            match self.peek() {
                None => return Err(ScanError::malformed(open, "unterminated string")),
                Some(b'"') => {
                    let end = self.pos;
                    self.bump();
                    return Ok(&self.buf[start..end]);
                }
                Some(b'\\') => {
                    self.bump();
                    match self.peek() {
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => self.bump(),
                        Some(b'u') => {
                            self.bump();
                            for _ in 0..4 {
                                match self.peek() {
                                    Some(h) if h.is_ascii_hexdigit() => self.bump(),
                                    _ => {
                                        return Err(ScanError::malformed(
                                            self.pos,
                                            "invalid unicode escape",
                                        ))
                                    }
                                }
                            }
                        }
                        _ => return Err(ScanError::malformed(self.pos, "invalid escape sequence")),
                    }
                }
                Some(byte) if byte < 0x20 => {
                    return Err(ScanError::malformed(self.pos, "control character in string"))
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn scan_number(&mut self) -> ScanResult<()> {
        if self.peek() == Some(b'-') {
            self.bump();
        }

        match self.peek() {
            Some(b'0') => self.bump(),
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            _ => return Err(ScanError::malformed(self.pos, "digit expected")),
        }

        if self.peek() == Some(b'.') {
            self.bump();
            if self.skip_digits() == 0 {
                return Err(ScanError::malformed(self.pos, "digit expected after decimal point"));
            }
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.bump();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump();
            }
            if self.skip_digits() == 0 {
                return Err(ScanError::malformed(self.pos, "digit expected in exponent"));
            }
        }

        Ok(())
    }

    fn scan_literal(&mut self, literal: &'static [u8]) -> ScanResult<()> {
        if self.buf[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(ScanError::malformed(self.pos, "invalid literal"))
        }
    }
}
