//! Configuration management
//!
//! Builder defaults loaded from TOML, with `ESBUILDER_SECTION__KEY`
//! environment overrides applied on top.

use crate::document::Direction;
use crate::error::{BuilderError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

const ENV_PREFIX: &str = "ESBUILDER_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Index addressing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Document type used when `set_index` is given no type
    pub default_type: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_type: "_doc".to_string(),
        }
    }
}

/// Query and reshaping defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Direction for `order(field)`: "asc" or "desc"
    pub default_direction: String,
    /// Flatten `_source` into records for `get`, `first` and `find`
    pub merge_source: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_direction: "asc".to_string(),
            merge_source: true,
        }
    }
}

impl QueryConfig {
    /// Parsed default direction, falling back to ascending
    pub fn direction(&self) -> Direction {
        Direction::parse(&self.default_direction).unwrap_or_default()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BuilderError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BuilderError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| BuilderError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: ESBUILDER_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply `ESBUILDER_`-prefixed key/value overrides; other keys are ignored
    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, value.as_ref()) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "INDEX__DEFAULT_TYPE" => {
                self.index.default_type = value.to_string();
            }
            "QUERY__DEFAULT_DIRECTION" => {
                let direction =
                    Direction::parse(value).ok_or_else(|| BuilderError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as sort direction", value),
                    })?;
                self.query.default_direction = direction.as_str().to_string();
            }
            "QUERY__MERGE_SOURCE" => {
                self.query.merge_source =
                    value.parse().map_err(|_| BuilderError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as boolean", value),
                    })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BuilderError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("esbuilder").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            index: IndexConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
        assert_eq!(config.index.default_type, "_doc");
        assert_eq!(config.query.direction(), Direction::Asc);
        assert!(config.query.merge_source);
    }

    #[test]
    fn test_overrides_apply_known_keys() {
        let mut config = Config::default();
        config.apply_overrides([
            ("ESBUILDER_INDEX__DEFAULT_TYPE", "doc"),
            ("ESBUILDER_QUERY__DEFAULT_DIRECTION", "DESC"),
            ("ESBUILDER_QUERY__MERGE_SOURCE", "false"),
            ("HOME", "/root"),
        ]);

        assert_eq!(config.index.default_type, "doc");
        assert_eq!(config.query.direction(), Direction::Desc);
        assert!(!config.query.merge_source);
    }

    #[test]
    fn test_invalid_override_is_skipped() {
        let mut config = Config::default();
        config.apply_overrides([
            ("ESBUILDER_QUERY__MERGE_SOURCE", "maybe"),
            ("ESBUILDER_QUERY__DEFAULT_DIRECTION", "sideways"),
            ("ESBUILDER_UNKNOWN__KEY", "x"),
        ]);

        assert!(config.query.merge_source);
        assert_eq!(config.query.default_direction, "asc");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let content = "[_meta]\nschema_version = \"1.0.0\"\n\n[query]\nmerge_source = false\n";
        let config: Config = toml::from_str(content).unwrap();
        assert!(!config.query.merge_source);
        assert_eq!(config.query.default_direction, "asc");
    }

    #[test]
    fn test_toml_sections_default_when_absent() {
        let config: Config = toml::from_str("[_meta]\nschema_version = \"1.0.0\"\n").unwrap();
        assert_eq!(config.index.default_type, "_doc");
        assert!(config.query.merge_source);
    }
}
