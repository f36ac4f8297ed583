//! Settings file for the command line front end
//!
//! A JSON document at `<config_dir>/tabledef/settings.json`, or wherever
//! `--config` points. Every field is optional; missing fields take their
//! defaults and command line flags override what the file says.
//!
//! ```json
//! {
//!   "parse": { "auto_gen_id": false, "skip_col_charset_if_equal": true },
//!   "default_schema": "app_db",
//!   "output": "table",
//!   "log_filter": "tabledef_parser=debug",
//!   "log_json": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabledef_core::{Result, TableDefError};
use tabledef_parser::ParseOptions;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub parse: ParseOptions,
    /// Schema used when `--schema` is not given
    pub default_schema: Option<String>,
    pub output: OutputFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is not set
    pub log_filter: Option<String>,
    /// Write log events as JSON lines
    pub log_json: bool,
}

impl Settings {
    /// `<config_dir>/tabledef/settings.json`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tabledef").join("settings.json"))
    }

    /// Load from `explicit` if given, which must then exist, otherwise from
    /// [`Settings::default_path`], falling back to defaults when that file
    /// is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(schema) = &self.default_schema {
            if schema.trim().is_empty() {
                return Err(TableDefError::Settings(
                    "default_schema must not be empty".to_string(),
                ));
            }
        }
        if let Some(filter) = &self.log_filter {
            EnvFilter::try_new(filter).map_err(|e| {
                TableDefError::Settings(format!("invalid log_filter '{filter}': {e}"))
            })?;
        }
        Ok(())
    }
}
