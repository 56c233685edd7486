//! Generator configuration.
//!
//! Loaded once per generation run and passed explicitly to the schema
//! builder and the model; nothing here is global.

use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Default maximum length for aggregate and member physical names.
pub const DEFAULT_MAX_NAME_LEN: usize = 64;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// GeneratorConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub naming: NamingConfig,
    pub display: DisplayConfig,
}

impl GeneratorConfig {
    /// Parse a configuration document; missing tables fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(source)?;

        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }
}

///
/// NamingConfig
/// Identifier rules applied to every physical name in the schema.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub max_name_len: usize,
    pub reserved: Vec<String>,
}

impl NamingConfig {
    #[must_use]
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.iter().any(|r| r == word)
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            reserved: ["self", "super", "crate"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

///
/// DisplayConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Use the effective key as the display name of aggregates that declare none.
    pub use_key_as_display_name: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_key_as_display_name: true,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();

        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.naming.max_name_len, DEFAULT_MAX_NAME_LEN);
        assert!(config.display.use_key_as_display_name);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            [naming]
            reserved = ["order"]
            "#,
        )
        .unwrap();

        assert!(config.naming.is_reserved("order"));
        assert!(!config.naming.is_reserved("self"));
        assert_eq!(config.naming.max_name_len, DEFAULT_MAX_NAME_LEN);
    }

    #[test]
    fn display_fallback_can_be_disabled() {
        let config = GeneratorConfig::from_toml_str(
            r"
            [display]
            use_key_as_display_name = false
            ",
        )
        .unwrap();

        assert!(!config.display.use_key_as_display_name);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GeneratorConfig::from_toml_str("[naming]\nmax_len = 3\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GeneratorConfig::load("/nonexistent/keystone.toml").unwrap_err();

        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("keystone.toml")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
