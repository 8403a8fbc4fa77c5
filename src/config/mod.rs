//! Configuration module for chartplan.
//!
//! Handles the SQL dialect, physical table naming, scope permission and
//! logging settings.

mod settings;

pub use settings::{
    expand_env_vars, LoggingSettings, ScopeSettings, Settings, SettingsError, SqlSettings,
};
