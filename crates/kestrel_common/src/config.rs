use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::DatabaseType;

/// Top-level merge-layer configuration (`kestrel.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Dialect spoken by every shard.
    #[serde(default)]
    pub database_type: DatabaseType,
    #[serde(default)]
    pub properties: MergeProperties,
}

/// Runtime properties passed to every merge strategy and decorator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeProperties {
    /// Log each assembled pipeline at `info` instead of `debug`.
    pub sql_show: bool,
    /// Decrypt cipher columns on read. When false, cipher text is returned as stored.
    pub query_with_cipher_column: bool,
    /// Reject registries with more than one merge-capable rule instead of
    /// letting the first one win.
    pub strict_merge_rules: bool,
    /// Upper bound on shard cursors accepted by a single assembly.
    pub max_shard_cursors: usize,
}

impl Default for MergeProperties {
    fn default() -> Self {
        Self {
            sql_show: false,
            query_with_cipher_column: true,
            strict_merge_rules: false,
            max_shard_cursors: 1024,
        }
    }
}

impl MergeProperties {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_shard_cursors == 0 {
            return Err(ConfigError::Invalid("max_shard_cursors must be > 0".into()));
        }
        Ok(())
    }
}

impl MergeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.properties.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MergeConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            database_type = %config.database_type,
            "Loaded merge config"
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
