//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{IngestConfig, QueryConfig, StorageConfig};
use crate::constants::{ENV_PREFIX, MAX_READ_POOL_SIZE, PROJECT_CONFIG_FILE, USER_CONFIG_DIR};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`CODENAV_*`)
/// 2. Project config (`codenav.toml` in project root)
/// 3. User config (`~/.codenav/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CodenavConfig {
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    pub query: QueryConfig,
}

impl CodenavConfig {
    /// Load configuration for the project rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &CodenavConfig) -> Result<(), ConfigError> {
        if let Some(size) = config.storage.read_pool_size {
            if !(1..=MAX_READ_POOL_SIZE).contains(&size) {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.read_pool_size".to_string(),
                    message: format!("must be between 1 and {MAX_READ_POOL_SIZE}"),
                });
            }
        }
        if config.query.default_search_limit == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "query.default_search_limit".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.query.max_search_limit == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "query.max_search_limit".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.query.effective_default_search_limit()
            > config.query.effective_max_search_limit()
        {
            return Err(ConfigError::ValidationFailed {
                field: "query.default_search_limit".to_string(),
                message: "must not exceed query.max_search_limit".to_string(),
            });
        }
        Ok(())
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(USER_CONFIG_DIR).join("config.toml"))
    }

    fn merge_toml_file(config: &mut CodenavConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: CodenavConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut CodenavConfig, other: &CodenavConfig) {
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }
        if other.ingest.derive_occurrences.is_some() {
            base.ingest.derive_occurrences = other.ingest.derive_occurrences;
        }
        if other.ingest.progress_every.is_some() {
            base.ingest.progress_every = other.ingest.progress_every;
        }
        if other.query.default_search_limit.is_some() {
            base.query.default_search_limit = other.query.default_search_limit;
        }
        if other.query.max_search_limit.is_some() {
            base.query.max_search_limit = other.query.max_search_limit;
        }
    }

    /// Pattern: `CODENAV_STORAGE_READ_POOL_SIZE`, `CODENAV_INGEST_DERIVE_OCCURRENCES`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides<F>(config: &mut CodenavConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        if let Some(v) = var("STORAGE_READ_POOL_SIZE").and_then(|v| v.parse().ok()) {
            config.storage.read_pool_size = Some(v);
        }
        if let Some(v) = var("STORAGE_BUSY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.storage.busy_timeout_ms = Some(v);
        }
        if let Some(v) = var("INGEST_DERIVE_OCCURRENCES").and_then(|v| v.parse().ok()) {
            config.ingest.derive_occurrences = Some(v);
        }
        if let Some(v) = var("INGEST_PROGRESS_EVERY").and_then(|v| v.parse().ok()) {
            config.ingest.progress_every = Some(v);
        }
        if let Some(v) = var("QUERY_DEFAULT_SEARCH_LIMIT").and_then(|v| v.parse().ok()) {
            config.query.default_search_limit = Some(v);
        }
        if let Some(v) = var("QUERY_MAX_SEARCH_LIMIT").and_then(|v| v.parse().ok()) {
            config.query.max_search_limit = Some(v);
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
