//! Runtime configuration for embedding applications and the CLI.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//!
//! # Invariants
//! - Missing variables fall back to defaults; present but blank ones are
//!   rejected.
//! - Logging stays disabled unless a log directory is configured.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "PHONEBOOK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "PHONEBOOK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "PHONEBOOK_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "phonebook.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but empty after trimming.
    Blank(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(name) => write!(f, "environment variable `{name}` is set but blank"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds a config from `PHONEBOOK_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = read_var(&lookup, DB_PATH_ENV)? {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read_var(&lookup, LOG_LEVEL_ENV)? {
            config.log_level = level;
        }
        if let Some(dir) = read_var(&lookup, LOG_DIR_ENV)? {
            config.log_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }
}

fn read_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(name) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Blank(name)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, "/tmp/contacts.db"),
            (LOG_LEVEL_ENV, " warn "),
            (LOG_DIR_ENV, "/tmp/phonebook-logs"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/contacts.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/phonebook-logs")));
    }

    #[test]
    fn blank_variable_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Blank(DB_PATH_ENV));
    }
}
