//! # Table Registry
//!
//! ## Purpose
//!
//! Dispatches load and dump commands to registered tables by id and keeps
//! per-table status for telemetry: the last action, whether it succeeded,
//! whether the table has ever loaded and the file involved.
//!
//! ## Command codes
//!
//! Load types arrive as raw command bytes and convert through
//! [`LoadType::try_from`]:
//!
//! | byte | load type |
//! |------|-----------|
//! | 0    | Replace   |
//! | 1    | Update    |
//!
//! Any other byte is rejected before a table is touched.

use std::fmt;
use std::path::{Path, PathBuf};

use num_enum::TryFromPrimitive;
use tracing::{error, info, warn};
use types::MAX_TABLES;

use crate::error::{RegistryError, TableError};

/// How a load applies to existing table contents
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum LoadType {
    /// Replace the entire table
    Replace = 0,
    /// Update individual entries
    Update = 1,
}

impl LoadType {
    pub const fn name(self) -> &'static str {
        match self {
            LoadType::Replace => "Replace",
            LoadType::Update => "Update",
        }
    }
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Most recent registry action on a table
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAction {
    #[default]
    Undefined = 0,
    Register = 1,
    Load = 2,
    Dump = 3,
}

impl TableAction {
    pub const fn name(self) -> &'static str {
        match self {
            TableAction::Undefined => "Undefined",
            TableAction::Register => "Register",
            TableAction::Load => "Load",
            TableAction::Dump => "Dump",
        }
    }
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A table the registry can load and dump
pub trait Table {
    fn load(&mut self, load_type: LoadType, path: &Path) -> Result<(), TableError>;

    fn dump(&self, path: &Path) -> Result<(), TableError>;
}

/// Identifier assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(usize);

impl TableId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {}", self.0)
    }
}

/// Status of one registered table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStatus {
    pub last_action: TableAction,
    pub last_action_ok: bool,
    /// True once any load has succeeded
    pub loaded: bool,
    pub file: Option<PathBuf>,
}

struct Entry {
    table: Box<dyn Table>,
    status: TableStatus,
}

/// Fixed-capacity set of tables addressed by [`TableId`]
pub struct TableRegistry {
    entries: Vec<Entry>,
    last_action_table: Option<TableId>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRegistry")
            .field("tables", &self.entries.len())
            .field("last_action_table", &self.last_action_table)
            .finish()
    }
}

impl TableRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_TABLES),
            last_action_table: None,
        }
    }

    /// Register a table without loading it
    pub fn register(&mut self, table: impl Table + 'static) -> Result<TableId, RegistryError> {
        if self.entries.len() >= MAX_TABLES {
            error!(max = MAX_TABLES, "table registry full");
            return Err(RegistryError::Full { max: MAX_TABLES });
        }

        let id = TableId(self.entries.len());
        self.entries.push(Entry {
            table: Box::new(table),
            status: TableStatus {
                last_action: TableAction::Register,
                last_action_ok: true,
                ..TableStatus::default()
            },
        });
        self.last_action_table = Some(id);

        info!(%id, "table registered");
        Ok(id)
    }

    /// Register a table and replace-load its default document
    ///
    /// The table stays registered even when the default load fails; the
    /// failure shows in its status.
    pub fn register_with_default(
        &mut self,
        table: impl Table + 'static,
        path: impl AsRef<Path>,
    ) -> Result<TableId, RegistryError> {
        let id = self.register(table)?;
        self.load(id, LoadType::Replace, path);
        Ok(id)
    }

    /// Load table `id`; returns whether the load succeeded
    pub fn load(&mut self, id: TableId, load_type: LoadType, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let Some(entry) = self.entries.get_mut(id.index()) else {
            error!(%id, "load command for unregistered table");
            return false;
        };

        let result = entry.table.load(load_type, path);
        let ok = result.is_ok();
        match result {
            Ok(()) => info!(%id, %load_type, path = %path.display(), "table loaded"),
            Err(err) => error!(
                %id,
                %load_type,
                path = %path.display(),
                error = %err,
                "table load failed"
            ),
        }

        entry.status.last_action = TableAction::Load;
        entry.status.last_action_ok = ok;
        entry.status.loaded |= ok;
        entry.status.file = Some(path.to_path_buf());
        self.last_action_table = Some(id);
        ok
    }

    /// Load from raw command fields
    pub fn load_command(&mut self, id: u8, load_type: u8, path: impl AsRef<Path>) -> bool {
        let Ok(load_type) = LoadType::try_from(load_type) else {
            error!(load_type, "invalid load type code");
            return false;
        };
        self.load(TableId(usize::from(id)), load_type, path)
    }

    /// Dump from raw command fields
    pub fn dump_command(&mut self, id: u8, path: impl AsRef<Path>) -> bool {
        self.dump(TableId(usize::from(id)), path)
    }

    /// Dump table `id`; returns whether the dump succeeded
    pub fn dump(&mut self, id: TableId, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let Some(entry) = self.entries.get_mut(id.index()) else {
            error!(%id, "dump command for unregistered table");
            return false;
        };

        let ok = match entry.table.dump(path) {
            Ok(()) => true,
            Err(err) => {
                error!(%id, path = %path.display(), error = %err, "table dump failed");
                false
            }
        };

        entry.status.last_action = TableAction::Dump;
        entry.status.last_action_ok = ok;
        entry.status.file = Some(path.to_path_buf());
        self.last_action_table = Some(id);
        ok
    }

    pub fn status(&self, id: TableId) -> Result<&TableStatus, RegistryError> {
        self.entries
            .get(id.index())
            .map(|entry| &entry.status)
            .ok_or(RegistryError::UnknownTable(id.index()))
    }

    /// Status of the table the most recent action touched
    pub fn last_status(&self) -> Option<(TableId, &TableStatus)> {
        let id = self.last_action_table?;
        self.status(id).ok().map(|status| (id, status))
    }

    /// Clear action history; load state and file names are kept
    pub fn reset_status(&mut self) {
        for entry in &mut self.entries {
            entry.status.last_action = TableAction::Undefined;
            entry.status.last_action_ok = false;
        }
        if self.last_action_table.take().is_none() {
            warn!("registry status reset with no recorded action");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
