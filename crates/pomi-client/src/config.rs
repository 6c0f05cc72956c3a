//! Configuration management for the Pomi client.
//!
//! Loads configuration from ${POMI_HOME}/config.toml with sensible defaults.
//! The API base URL can always be overridden with the POMI_BASE_URL
//! environment variable.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Pomi API (e.g. `https://api.pomi.example/api`).
    pub base_url: String,

    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u64,
}

impl Config {
    /// Default API base URL (local development server).
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000/api";

    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes a default config file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves the effective base URL: POMI_BASE_URL env var wins over the
    /// configured value. A trailing slash is trimmed so paths can be joined
    /// with a plain `format!`.
    pub fn effective_base_url(&self) -> String {
        let url = std::env::var("POMI_BASE_URL").unwrap_or_else(|_| self.base_url.clone());
        url.trim_end_matches('/').to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Default config.toml contents written by `config init`.
fn default_config_template() -> String {
    format!(
        "# Pomi client configuration\n\
         \n\
         # Base URL of the Pomi API\n\
         base_url = \"{}\"\n\
         \n\
         # Request timeout in seconds (0 disables)\n\
         # timeout_secs = {}\n",
        Config::DEFAULT_BASE_URL,
        Config::DEFAULT_TIMEOUT_SECS,
    )
}

pub mod paths {
    //! Path resolution for Pomi configuration and token storage.
    //!
    //! POMI_HOME resolution order:
    //! 1. POMI_HOME environment variable (if set)
    //! 2. ~/.config/pomi (default)

    use std::path::PathBuf;

    /// Returns the Pomi home directory.
    ///
    /// Checks POMI_HOME env var first, falls back to ~/.config/pomi
    pub fn pomi_home() -> PathBuf {
        if let Ok(home) = std::env::var("POMI_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("pomi"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        pomi_home().join("config.toml")
    }

    /// Returns the path to the tokens.json file.
    pub fn tokens_path() -> PathBuf {
        pomi_home().join("tokens.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, Config::DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, Config::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"https://pomi.example/api\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://pomi.example/api");
        assert_eq!(config.timeout_secs, Config::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::init(&path).unwrap();
        assert!(path.exists());

        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_init_output_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::init(&path).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, Config::DEFAULT_BASE_URL);
    }
}
