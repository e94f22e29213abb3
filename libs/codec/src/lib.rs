//! # Bounded JSON Search and Value Binding
//!
//! ## Purpose
//!
//! This crate is the "Rules" layer of the initialization-table system:
//! - Structural validation of a JSON document held in a fixed buffer
//! - Non-materializing, first-match key search over that document
//! - Integer conversion with explicit truncation reporting
//! - Declarative binding of found values into typed table slots
//!
//! No tree is ever built. A [`Document`] is a validated borrow of the raw
//! buffer, and every [`JsonValue`] it returns is a sub-slice of it.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/initbl
//!     ↑           ↓           ↓
//! Pure Data   Search and   Parameter
//! Limits      Binding      Tables
//! ```
//!
//! ## What This Crate Contains
//! - [`DocumentBuffer`]: capacity-checked document reads
//! - [`Document`]: validated document with [`Document::search`]
//! - [`Binding`] / [`BindingSet`]: key-to-slot rules and the loader
//! - [`parse_integer`]: number text to `i32`
//!
//! ## What This Crate Does NOT Contain
//! - Parameter naming or key prefixes (belongs in libs/initbl)
//! - Table registration and load/dump commands
//! - Any JSON writing
//!
//! ## Examples
//!
//! ```
//! use codec::{load_all, Binding, Document, ScanLimits};
//! use types::{JsonType, SlotRef, Value};
//!
//! let json = br#"{"config.Port": 8080, "config.Host": "localhost"}"#;
//! let doc = Document::parse(json, ScanLimits::default())?;
//!
//! let mut slots = vec![Value::Empty; 2];
//! let mut bindings = vec![
//!     Binding::new("config.Port", JsonType::Number, SlotRef(0), 4)?,
//!     Binding::new("config.Host", JsonType::String, SlotRef(1), 64)?,
//! ];
//!
//! assert_eq!(load_all(&mut bindings, &doc, &mut slots), 2);
//! assert_eq!(slots[0], Value::Int(8080));
//! # Ok::<(), codec::ScanError>(())
//! ```

pub mod binding;
pub mod buffers;
pub mod error;
pub mod number;
pub mod parser;

pub use binding::{
    load_all, load_all_with, load_one, log_segments, BindState, Binding, BindingSet,
    BindingTarget, Necessity, QueryKey,
};
pub use buffers::{CapacityExceeded, DocumentBuffer, StagingBuffer};
pub use error::{BindError, BindResult, ConversionError, ScanError, ScanResult};
pub use number::{parse_integer, IntegerParse};
pub use parser::{search, search_with_limits, validate, Document, JsonValue, ScanLimits};
