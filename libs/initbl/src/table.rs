//! # Initialization Parameter Table
//!
//! ## Purpose
//!
//! An [`IniTable`] owns everything one configuration table needs: the
//! descriptors built from a parameter enumeration, the document buffer and
//! one value slot per parameter id. Applications construct it once at
//! startup and read parameters through total accessors.
//!
//! ## Lifecycle
//!
//! ```text
//! IniTable::new ──► load_file / load_bytes ──► get_int / get_str
//!      │                    ▲     │
//!      │ build errors       └─────┘ reload: every slot reset first
//!      ▼
//!  ConfigError
//! ```
//!
//! A load pass resets every descriptor and slot before searching, so an
//! accessor only ever sees values from the most recent pass.
//!
//! ## Accessors
//!
//! [`IniTable::get_int`] and [`IniTable::get_str`] never fail: on a bad id,
//! an unloaded parameter or a type mismatch they log an error and return
//! `0` or `""`. The `try_get_*` forms report the reason instead.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use codec::{Binding, BindingSet, BindState, DocumentBuffer, ScanLimits};
use serde_json::value::RawValue;
use tracing::{error, info};
use types::{ParamType, Value};

use crate::error::{AccessError, ConfigError, ConfigResult, TableError};
use crate::params::{binding_index, build_bindings, ParamEnum, ParamInfo};
use crate::registry::{LoadType, Table};
use crate::settings::IniTableSettings;

/// One row of a table, for inspection
#[derive(Debug, Clone, Copy)]
pub struct TableEntry<'a> {
    pub id: u16,
    pub name: &'a str,
    pub key: &'a str,
    pub param_type: ParamType,
    pub state: BindState,
    /// Present only when bound by the most recent pass
    pub value: Option<&'a Value>,
}

/// JSON-backed configuration parameter table
#[derive(Debug)]
pub struct IniTable {
    settings: IniTableSettings,
    start: u16,
    end: u16,
    params: Vec<ParamInfo>,
    bindings: BindingSet,
    values: Vec<Value>,
    buffer: DocumentBuffer,
    source: Option<PathBuf>,
}

impl IniTable {
    /// Build the descriptors for `params`; no I/O
    pub fn new<P>(params: &P, settings: IniTableSettings) -> ConfigResult<Self>
    where
        P: ParamEnum + ?Sized,
    {
        settings.validate()?;
        let (bindings, infos) = build_bindings(params, &settings)?;

        Ok(Self {
            start: params.start(),
            end: params.end(),
            params: infos,
            bindings: BindingSet::new(bindings),
            values: vec![Value::Empty; usize::from(params.end())],
            buffer: DocumentBuffer::with_capacity(settings.max_document_bytes),
            source: None,
            settings,
        })
    }

    /// Build and load in one step; fails unless every parameter is bound
    pub fn construct<P>(
        path: impl AsRef<Path>,
        params: &P,
        settings: IniTableSettings,
    ) -> ConfigResult<Self>
    where
        P: ParamEnum + ?Sized,
    {
        let mut table = Self::new(params, settings)?;
        table.load_file(path)?;
        Ok(table)
    }

    /// Run a full load pass from a file
    ///
    /// Returns the number of parameters bound, or
    /// [`ConfigError::IncompleteLoad`] if any parameter was not.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<usize> {
        let path = path.as_ref();
        self.reset();

        if let Err(err) = self.buffer.read_file(path) {
            error!(
                path = %path.display(),
                status = err.status(),
                error = %err,
                "table document read failed"
            );
            return Err(err.into());
        }

        self.source = Some(path.to_path_buf());
        self.bind_buffer()
    }

    /// Run a full load pass from an in-memory document
    pub fn load_bytes(&mut self, bytes: &[u8]) -> ConfigResult<usize> {
        self.reset();

        if let Err(err) = self.buffer.fill_from_slice(bytes) {
            error!(status = err.status(), error = %err, "table document rejected");
            return Err(err.into());
        }

        self.source = None;
        self.bind_buffer()
    }

    fn reset(&mut self) {
        self.bindings.reset_all();
        self.values.fill(Value::Empty);
    }

    fn bind_buffer(&mut self) -> ConfigResult<usize> {
        let limits = ScanLimits::with_max_depth(self.settings.max_depth);
        let doc = self.buffer.document(limits).map_err(|err| {
            error!(status = err.status(), error = %err, "table document invalid");
            ConfigError::from(err)
        })?;

        let loaded = self.bindings.load(&doc, &mut self.values);
        let expected = self.bindings.len();
        info!(loaded, expected, bytes = doc.len(), "table load pass complete");

        if loaded < expected {
            return Err(ConfigError::IncompleteLoad { loaded, expected });
        }
        Ok(loaded)
    }

    /// Integer parameter `id`, or 0 when unavailable
    pub fn get_int(&self, id: impl Into<u16>) -> i32 {
        let id = id.into();
        self.try_get_int(id).unwrap_or_else(|err| {
            error!(id, error = %err, "integer parameter unavailable");
            0
        })
    }

    /// String parameter `id`, or `""` when unavailable
    pub fn get_str(&self, id: impl Into<u16>) -> &str {
        let id = id.into();
        self.try_get_str(id).unwrap_or_else(|err| {
            error!(id, error = %err, "string parameter unavailable");
            ""
        })
    }

    pub fn try_get_int(&self, id: impl Into<u16>) -> Result<i32, AccessError> {
        let id = id.into();
        let binding = self.checked_binding(id, ParamType::Int)?;
        self.slot(id)
            .and_then(Value::as_int)
            .ok_or_else(|| not_loaded(id, binding))
    }

    pub fn try_get_str(&self, id: impl Into<u16>) -> Result<&str, AccessError> {
        let id = id.into();
        let binding = self.checked_binding(id, ParamType::Str)?;
        self.slot(id)
            .and_then(Value::as_str)
            .ok_or_else(|| not_loaded(id, binding))
    }

    fn checked_binding(&self, id: u16, requested: ParamType) -> Result<&Binding, AccessError> {
        let index = binding_index(self.start, id)
            .filter(|_| id < self.end)
            .ok_or(AccessError::OutOfRange {
                id,
                start: self.start,
                end: self.end,
            })?;

        let (info, binding) = self
            .params
            .get(index)
            .zip(self.bindings.get(index))
            .ok_or(AccessError::OutOfRange {
                id,
                start: self.start,
                end: self.end,
            })?;

        if info.param_type != requested {
            return Err(AccessError::TypeMismatch {
                id,
                key: binding.key().to_string(),
                declared: info.param_type,
                requested,
            });
        }
        if !binding.found() {
            return Err(not_loaded(id, binding));
        }
        Ok(binding)
    }

    fn slot(&self, id: u16) -> Option<&Value> {
        self.values.get(usize::from(id))
    }

    /// Descriptor for parameter `id`
    pub fn binding(&self, id: impl Into<u16>) -> Option<&Binding> {
        let id = id.into();
        binding_index(self.start, id).and_then(|i| self.bindings.get(i))
    }

    /// Every parameter with its most recent load state
    pub fn entries(&self) -> impl Iterator<Item = TableEntry<'_>> {
        self.params
            .iter()
            .zip(self.bindings.iter())
            .map(|(info, binding)| TableEntry {
                id: info.id,
                name: &info.name,
                key: binding.key(),
                param_type: info.param_type,
                state: binding.state(),
                value: binding.found().then(|| self.slot(info.id)).flatten(),
            })
    }

    /// Write bound values as a JSON object keyed by query key
    pub fn dump(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let dump_err = |source: std::io::Error| ConfigError::Dump {
            path: path.to_path_buf(),
            source,
        };

        let values = self
            .entries()
            .filter_map(|entry| entry.value.map(|v| (entry.key, v)))
            .map(|(key, value)| raw_json(value).map(|raw| (key, raw)))
            .collect::<serde_json::Result<BTreeMap<&str, Box<RawValue>>>>()
            .map_err(|e| dump_err(e.into()))?;

        let mut writer = BufWriter::new(File::create(path).map_err(dump_err)?);
        serde_json::to_writer_pretty(&mut writer, &values).map_err(|e| dump_err(e.into()))?;
        writer.flush().map_err(dump_err)?;

        info!(path = %path.display(), params = values.len(), "table dumped");
        Ok(())
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameters bound by the most recent pass
    pub fn loaded_count(&self) -> usize {
        self.bindings.found_count()
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.bindings.all_found()
    }

    /// File of the most recent load, if it came from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn settings(&self) -> &IniTableSettings {
        &self.settings
    }
}

fn not_loaded(id: u16, binding: &Binding) -> AccessError {
    AccessError::NotYetLoaded {
        id,
        key: binding.key().to_string(),
    }
}

impl Table for IniTable {
    fn load(&mut self, load_type: LoadType, path: &Path) -> Result<(), TableError> {
        match load_type {
            LoadType::Replace => {
                self.load_file(path)?;
                Ok(())
            }
            LoadType::Update => {
                error!(load_type = load_type.name(), "parameter tables only support replace loads");
                Err(TableError::UnsupportedLoadType(load_type.name()))
            }
        }
    }

    fn dump(&self, path: &Path) -> Result<(), TableError> {
        IniTable::dump(self, path)?;
        Ok(())
    }
}

/// JSON token for a bound slot. String slots still hold the document's
/// escape sequences, so they are quoted as-is rather than escaped again.
fn raw_json(value: &Value) -> serde_json::Result<Box<RawValue>> {
    match value {
        Value::Empty => RawValue::from_string("null".to_owned()),
        Value::Int(v) => RawValue::from_string(v.to_string()),
        Value::Str(raw) => RawValue::from_string(format!("\"{raw}\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamList;

    crate::param_enum! {
        enum NodeParam {
            Port: int,
            Name: str,
        }
    }

    fn node_table() -> IniTable {
        IniTable::new(&NodeParam::PARAMS, IniTableSettings::with_prefix("cfg.")).unwrap()
    }

    #[test]
    fn test_load_bytes_and_accessors() {
        let mut table = node_table();
        let loaded = table
            .load_bytes(br#"{"cfg.Port": 8080, "cfg.Name": "node-a"}"#)
            .unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(table.get_int(NodeParam::Port), 8080);
        assert_eq!(table.get_str(NodeParam::Name), "node-a");
        assert!(table.is_fully_loaded());
    }

    #[test]
    fn test_accessor_sentinels() {
        let mut table = node_table();
        assert_eq!(table.get_int(NodeParam::Port), 0);
        assert_eq!(
            table.try_get_int(NodeParam::Port),
            Err(AccessError::NotYetLoaded {
                id: 1,
                key: "cfg.Port".into()
            })
        );

        table
            .load_bytes(br#"{"cfg.Port": 1, "cfg.Name": "x"}"#)
            .unwrap();

        assert_eq!(table.get_str(NodeParam::Port), "");
        assert!(matches!(
            table.try_get_str(NodeParam::Port),
            Err(AccessError::TypeMismatch { .. })
        ));
        assert!(matches!(
            table.try_get_int(NodeParam::Start),
            Err(AccessError::OutOfRange { id: 0, .. })
        ));
        assert!(matches!(
            table.try_get_int(NodeParam::End),
            Err(AccessError::OutOfRange { id: 3, .. })
        ));
    }

    #[test]
    fn test_incomplete_load_hides_stale_values() {
        let mut table = node_table();
        table
            .load_bytes(br#"{"cfg.Port": 8080, "cfg.Name": "node-a"}"#)
            .unwrap();

        let err = table.load_bytes(br#"{"cfg.Name": "node-b"}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IncompleteLoad {
                loaded: 1,
                expected: 2
            }
        ));
        assert_eq!(table.get_int(NodeParam::Port), 0);
        assert_eq!(table.get_str(NodeParam::Name), "node-b");
        assert_eq!(table.loaded_count(), 1);
    }

    #[test]
    fn test_malformed_document_binds_nothing() {
        let mut table = node_table();
        table
            .load_bytes(br#"{"cfg.Port": 8080, "cfg.Name": "node-a"}"#)
            .unwrap();

        let err = table.load_bytes(br#"{"cfg.Port": 9090,"#).unwrap_err();
        assert!(matches!(err, ConfigError::Document(_)));
        assert_eq!(table.loaded_count(), 0);
        assert_eq!(table.get_int(NodeParam::Port), 0);
    }

    #[test]
    fn test_entries_report_state() {
        let mut table = node_table();
        let _ = table.load_bytes(br#"{"cfg.Port": "8080", "cfg.Name": "n"}"#);

        let entries: Vec<TableEntry<'_>> = table.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].state, BindState::TypeMismatch);
        assert_eq!(entries[0].value, None);
        assert_eq!(entries[1].key, "cfg.Name");
        assert_eq!(entries[1].value, Some(&Value::Str("n".into())));
    }

    #[test]
    fn test_update_load_rejected() {
        let mut table = node_table();
        let err = Table::load(&mut table, LoadType::Update, Path::new("unused.json")).unwrap_err();
        assert!(matches!(err, TableError::UnsupportedLoadType("Update")));
    }

    #[test]
    fn test_document_ceiling_from_settings() {
        let settings = IniTableSettings {
            max_document_bytes: 16,
            ..IniTableSettings::default()
        };
        let mut params = ParamList::default();
        params.push("Port", ParamType::Int);

        let mut table = IniTable::new(&params, settings).unwrap();
        let err = table
            .load_bytes(br#"{"config.Port": 8080}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Document(codec::ScanError::DocumentTooLarge { .. })
        ));
    }
}
