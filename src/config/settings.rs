//! TOML-based configuration for chartplan.
//!
//! Supports a config file (chartplan.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [sql]
//! dialect = "postgres"
//! schema = "${SQUASH_SCHEMA}"
//!
//! [sql.tables]
//! test_case = "tm_test_case"
//!
//! [scope]
//! permission = "READ"
//!
//! [logging]
//! filter = "chartplan=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::naming::TableNaming;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub sql: SqlSettings,
    pub scope: ScopeSettings,
    pub logging: LoggingSettings,
}

/// SQL rendering configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Dialect the SQL is rendered for.
    pub dialect: Dialect,

    /// Schema qualifying every table (supports ${ENV_VAR} expansion).
    pub schema: Option<String>,

    /// Physical table names keyed by logical name.
    pub tables: BTreeMap<String, String>,
}

/// Scope restriction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeSettings {
    /// Action checked for every scope reference.
    pub permission: String,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            permission: "READ".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        if settings.scope.permission.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "scope.permission must not be empty".into(),
            ));
        }
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CHARTPLAN_CONFIG`
    /// 2. `./chartplan.toml`
    /// 3. `~/.config/chartplan/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("CHARTPLAN_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("chartplan.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("chartplan").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Physical naming for the compilers, with the schema expanded.
    pub fn table_naming(&self) -> Result<TableNaming, SettingsError> {
        let mut naming = TableNaming::new();
        if let Some(schema) = &self.sql.schema {
            naming = naming.with_schema(&expand_env_vars(schema)?);
        }
        for (logical, physical) in &self.sql.tables {
            naming = naming.with_override(logical, physical);
        }
        Ok(naming)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut var_name = String::new();
        while let Some(ch) = chars.next_if(|&ch| {
            if braced {
                ch != '}'
            } else {
                ch.is_alphanumeric() || ch == '_'
            }
        }) {
            var_name.push(ch);
        }
        if braced {
            if chars.next_if_eq(&'}').is_none() {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated variable reference in '{s}'"
                )));
            }
        } else if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
