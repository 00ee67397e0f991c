//! Host binding configuration.
//!
//! A TOML file describing the host interpreter: its native integer width,
//! classes declared on the host side, and the parameter schemas for each
//! binding call site.
//!
//! ```toml
//! [host]
//! int_width = 32
//!
//! [[classes]]
//! name = "MyDoc"
//! parent = "Hash"
//!
//! [[schemas]]
//! name = "MyDoc::new_PARAMS"
//! params = ["name", "count"]
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::host::IntWidth;

/// Binding configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Host interpreter settings.
    #[serde(default)]
    pub host: HostConfig,
    /// Host-side class declarations.
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
    /// Parameter schemas.
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

/// Host interpreter settings.
#[derive(Debug, Default, Deserialize)]
pub struct HostConfig {
    /// Native integer width in bits, 32 or 64.
    #[serde(default)]
    pub int_width: IntWidth,
}

/// A class declared by the host, with its parent.
#[derive(Debug, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    pub parent: String,
}

/// The legal labels of one binding call site.
#[derive(Debug, Deserialize)]
pub struct SchemaConfig {
    pub name: String,
    pub params: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[host]
int_width = 32

[[classes]]
name = "MyDoc"
parent = "Hash"

[[schemas]]
name = "MyDoc::new_PARAMS"
params = ["name", "count"]

[[schemas]]
name = "MyDoc::add_PARAMS"
params = ["field"]
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.host.int_width, IntWidth::W32);
        assert_eq!(config.classes.first().unwrap().parent, "Hash");
        assert_eq!(config.schemas.len(), 2);
        assert_eq!(config.schemas.get(1).unwrap().params, vec!["field"]);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.host.int_width, IntWidth::W64);
        assert!(config.classes.is_empty());
        assert!(config.schemas.is_empty());
    }

    #[test]
    fn test_bad_width() {
        let err = Config::from_str("[host]\nint_width = 16\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("unsupported native integer width"));
    }
}
