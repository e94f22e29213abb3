//! # Table Binding Types
//!
//! Shared vocabulary for the JSON table binding workspace.
//!
//! ## Contents
//!
//! - **JsonType**: closed set of value kinds reported by the key search
//! - **ParamType**: the two scalar kinds a configuration parameter may declare
//! - **FixedStr**: inline, capacity-checked string used for query keys
//! - **Value**: one destination slot of a bound table
//! - **limits**: platform ceilings (key length, table size, document size, depth)
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → libs/initbl
//!     ↑            ↓             ↓
//!  Type tags   Search/Bind   Config table
//!  Limits      Descriptors   Registry, CLI
//! ```
//!
//! This crate has no behavior beyond construction and rendering, so both
//! `codec` and `initbl` depend on it without pulling in I/O or logging.

pub mod errors;
pub mod fixed_str;
pub mod json;
pub mod limits;
pub mod param;
pub mod value;

pub use errors::FixedStrError;
pub use fixed_str::FixedStr;
pub use json::JsonType;
pub use limits::*;
pub use param::ParamType;
pub use value::{SlotRef, Value};
