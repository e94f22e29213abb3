//! Table Settings
//!
//! Runtime limits and naming for a configuration table. Defaults are the
//! platform limits from [`types::limits`]; a settings file and environment
//! variables may lower them, never raise them.
//!
//! ```toml
//! namespace_prefix = "cfg."
//! max_items = 16
//! default_document = "$HOME/app/ini.json"
//! ```
//!
//! Environment overrides use the `INITBL_` prefix, e.g. `INITBL_MAX_DEPTH=8`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::{
    CONFIG_KEY_PREFIX, MAX_CFG_ITEMS, MAX_CFG_STR_LEN, MAX_DOCUMENT_BYTES, MAX_JSON_DEPTH,
    MAX_KEY_LEN,
};

use crate::error::ConfigError;

/// Settings for one configuration table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IniTableSettings {
    /// Prepended to every parameter name to form its query key
    pub namespace_prefix: String,
    /// Maximum number of parameters
    pub max_items: usize,
    /// String slot width, terminator included
    pub max_str_len: usize,
    /// Largest document read
    pub max_document_bytes: usize,
    /// Maximum container nesting
    pub max_depth: usize,
    /// Document loaded when a table is registered with its default
    pub default_document: Option<String>,
}

impl Default for IniTableSettings {
    fn default() -> Self {
        Self {
            namespace_prefix: CONFIG_KEY_PREFIX.to_string(),
            max_items: MAX_CFG_ITEMS,
            max_str_len: MAX_CFG_STR_LEN,
            max_document_bytes: MAX_DOCUMENT_BYTES,
            max_depth: MAX_JSON_DEPTH,
            default_document: None,
        }
    }
}

impl IniTableSettings {
    /// Defaults with a different key namespace
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            namespace_prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Load settings from an optional file with `INITBL_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading table settings: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("INITBL").try_parsing(true));

        let settings: Self = builder
            .build()
            .context("Failed to build table settings")?
            .try_deserialize()
            .context("Failed to deserialize table settings")?;

        settings.validate()?;
        debug!(?settings, "table settings loaded");
        Ok(settings)
    }

    /// Reject zero limits and anything above the platform ceilings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("max_items", self.max_items, MAX_CFG_ITEMS),
            ("max_str_len", self.max_str_len, MAX_CFG_STR_LEN),
            ("max_document_bytes", self.max_document_bytes, MAX_DOCUMENT_BYTES),
            ("max_depth", self.max_depth, MAX_JSON_DEPTH),
        ];

        for (name, value, ceiling) in checks {
            if value == 0 || value > ceiling {
                return Err(ConfigError::Settings(format!(
                    "{name} must be in 1..={ceiling}, got {value}"
                )));
            }
        }

        if self.namespace_prefix.len() >= MAX_KEY_LEN {
            return Err(ConfigError::Settings(format!(
                "namespace_prefix leaves no room for a name ({} of {MAX_KEY_LEN} bytes)",
                self.namespace_prefix.len()
            )));
        }

        Ok(())
    }

    /// Default document path with environment variables expanded
    pub fn default_document_path(&self) -> Result<Option<PathBuf>> {
        self.default_document
            .as_deref()
            .map(|raw| {
                shellexpand::env(raw)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .context("Failed to expand default document path")
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_platform_limits() {
        let settings = IniTableSettings::default();
        assert_eq!(settings.namespace_prefix, "config.");
        assert_eq!(settings.max_items, 32);
        assert_eq!(settings.max_str_len, 64);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_limits() {
        let zero = IniTableSettings {
            max_depth: 0,
            ..IniTableSettings::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::Settings(_))));

        let too_many = IniTableSettings {
            max_items: MAX_CFG_ITEMS + 1,
            ..IniTableSettings::default()
        };
        assert!(too_many.validate().is_err());

        let long_prefix = IniTableSettings::with_prefix("p".repeat(MAX_KEY_LEN));
        assert!(long_prefix.validate().is_err());
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "namespace_prefix = \"cfg.\"\nmax_items = 8").unwrap();

        let settings = IniTableSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.namespace_prefix, "cfg.");
        assert_eq!(settings.max_items, 8);
        assert_eq!(settings.max_str_len, MAX_CFG_STR_LEN);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_items = 1000").unwrap();
        assert!(IniTableSettings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_default_document_path() {
        let settings = IniTableSettings {
            default_document: Some("/etc/app/ini.json".into()),
            ..IniTableSettings::default()
        };
        assert_eq!(
            settings.default_document_path().unwrap(),
            Some(PathBuf::from("/etc/app/ini.json"))
        );
        assert_eq!(IniTableSettings::default().default_document_path().unwrap(), None);
    }
}
