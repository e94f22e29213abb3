//! # Initialization Parameter Tables
//!
//! ## Purpose
//!
//! Loads application configuration from a JSON document into a fixed,
//! strongly-typed parameter table at startup. Parameters come from a
//! densely-numbered enumeration; each one is looked up under a namespaced
//! key (`config.<Name>` by default), type-checked and stored by id.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → [initbl]
//!                               ↓
//!                 ParamEnum → IniTable → TableRegistry
//!                             get_int     load / dump
//!                             get_str     by table id
//! ```
//!
//! ## Examples
//!
//! ```no_run
//! use initbl::{param_enum, IniTable, IniTableSettings};
//!
//! param_enum! {
//!     pub enum AppParam {
//!         Port: int,
//!         Name: str,
//!     }
//! }
//!
//! let table = IniTable::construct("app_ini.json", &AppParam::PARAMS, IniTableSettings::default())?;
//! let port = table.get_int(AppParam::Port);
//! let name = table.get_str(AppParam::Name);
//! # Ok::<(), initbl::ConfigError>(())
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Document parsing or key search (belongs in libs/codec)
//! - Subscriber setup; the host application owns logging output

pub mod error;
pub mod params;
pub mod registry;
pub mod settings;
pub mod table;

pub use error::{AccessError, ConfigError, ConfigResult, RegistryError, TableError};
pub use params::{
    binding_index, build_bindings, ParamEnum, ParamInfo, ParamList, ParamSpec, StaticParams,
};
pub use registry::{LoadType, Table, TableAction, TableId, TableRegistry, TableStatus};
pub use settings::IniTableSettings;
pub use table::{IniTable, TableEntry};
