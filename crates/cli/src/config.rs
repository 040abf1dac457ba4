//! Configuration management for the CLI

use crate::client::Protocol;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI defaults read from `~/.config/slr/config.json`
///
/// Command-line flags and environment variables take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server address
    pub server: Option<String>,
    /// Default protocol
    pub protocol: Option<Protocol>,
    /// Default output format
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Load configuration from the default location, if present
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("slr").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.json")).unwrap();

        assert!(config.server.is_none());
        assert!(config.protocol.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": "slr.internal:50051", "protocol": "grpc"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.as_deref(), Some("slr.internal:50051"));
        assert_eq!(config.protocol, Some(Protocol::Grpc));
        assert!(config.format.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{server").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
