//! Save configuration.
//!
//! Every field is defaulted, so an empty TOML document is a valid config.
//!
//! ```toml
//! max_concurrent_mutations = 8
//! limit_concurrency = true
//! ```

use progmerge_core::errors::{ExError, ExErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the persistence phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Maximum in-flight mutation calls against the gateway
    pub max_concurrent_mutations: usize,
    /// When false, mutations fan out without a bound
    pub limit_concurrency: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            max_concurrent_mutations: 16,
            limit_concurrency: true,
        }
    }
}

impl SaveConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ExError> {
        let config: SaveConfig = toml::from_str(source).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(format!("Invalid save config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, ExError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_entity_id(path.display().to_string())
                .with_message(format!("Cannot read save config: {}", e))
        })?;
        Self::from_toml_str(&source)
    }

    /// A limited executor with zero permits would never make progress.
    pub fn validate(&self) -> Result<(), ExError> {
        if self.limit_concurrency && self.max_concurrent_mutations == 0 {
            return Err(ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message("max_concurrent_mutations must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SaveConfig::from_toml_str("").unwrap();
        assert_eq!(config, SaveConfig::default());
        assert_eq!(config.max_concurrent_mutations, 16);
    }

    #[test]
    fn test_partial_document_overrides_one_field() {
        let config = SaveConfig::from_toml_str("max_concurrent_mutations = 4").unwrap();
        assert_eq!(config.max_concurrent_mutations, 4);
        assert!(config.limit_concurrency);
    }

    #[test]
    fn test_zero_permits_rejected() {
        let err = SaveConfig::from_toml_str("max_concurrent_mutations = 0").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = SaveConfig::from_toml_str("max_concurrent_mutations = \"many\"").unwrap_err();
        assert_eq!(err.code(), "ERR_CONFIG");
    }
}
