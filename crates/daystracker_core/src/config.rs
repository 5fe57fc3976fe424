//! Core configuration.
//!
//! # Responsibility
//! - Describe where the snapshot lives and how logging is set up.
//! - Parse the JSON config file handed over by the host app.
//!
//! # Invariants
//! - Missing fields take defaults; unknown fields are ignored.
//! - `storage_key` is never blank after `validate()`.

use crate::persistence::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime configuration for opening the event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite file holding the snapshot. `None` keeps everything in memory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// `trace|debug|info|warn|error`. Logging stays off unless both
    /// `log_level` and `log_dir` are set.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            storage_key: default_storage_key(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Config persisting to `db_path` with every other field defaulted.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(db_path.into()),
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key cannot be blank".to_string()));
        }
        if self.log_level.is_some() != self.log_dir.is_some() {
            return Err(ConfigError::Invalid(
                "log_level and log_dir must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage_key, "events");
    }

    #[test]
    fn fields_are_read_and_unknown_fields_ignored() {
        let config = CoreConfig::from_json_str(
            r#"{"db_path":"/data/days.sqlite3","storage_key":"events_v2","theme":"glass"}"#,
        )
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/data/days.sqlite3")));
        assert_eq!(config.storage_key, "events_v2");
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"storage_key":"  "}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"log_level":"info"}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CoreConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CoreConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
