//! Shell configuration.
//!
//! Loaded from an optional TOML file:
//!
//! ```toml
//! name = "vault"
//! prompt = "vault> "
//! history_file = "/home/me/.vault_history"
//! max_history = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings of the interactive shell. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Application name shown in the usage banner.
    pub name: String,
    pub prompt: String,
    /// Where the read loop loads and saves line history, if anywhere.
    pub history_file: Option<PathBuf>,
    pub max_history: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            name: "cmdshell".to_string(),
            prompt: "> ".to_string(),
            history_file: None,
            max_history: 100,
        }
    }
}

impl ShellConfig {
    /// Reads the config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = ShellConfig::from_toml_str("prompt = \"$ \"").unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.name, "cmdshell");
        assert_eq!(config.max_history, 100);
        assert!(config.history_file.is_none());

        assert_eq!(ShellConfig::from_toml_str("").unwrap(), ShellConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ShellConfig::from_toml_str("max_history = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"vault\"\nhistory_file = \"/tmp/vault_history\"").unwrap();

        let config = ShellConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "vault");
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/vault_history")));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
