//! Application configuration management.
//!
//! Configuration is stored at `~/.config/attribution/config.json` and holds
//! the server base URL, an optional CSRF token and the request timeout.
//! `ATTRIBUTION_BASE_URL` and `ATTRIBUTION_CSRF_TOKEN` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Application name used for config/state directory paths
const APP_NAME: &str = "attribution";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Server used when nothing is configured
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "ATTRIBUTION_BASE_URL";
pub const ENV_CSRF_TOKEN: &str = "ATTRIBUTION_CSRF_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub csrf_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub state_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override file values with the given environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(token) = lookup(ENV_CSRF_TOKEN).filter(|v| !v.is_empty()) {
            self.csrf_token = Some(token);
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the saved selection and log files
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.state_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attribution").join("config.json");
        let config = Config {
            base_url: Some("https://stages.example.org".to_string()),
            request_timeout_secs: Some(10),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert_eq!(Config::load_from(&dir.path().join("missing.json")).unwrap(), Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            base_url: Some("https://file.example.org".to_string()),
            csrf_token: Some("from-file".to_string()),
            ..Default::default()
        };
        config.apply_env(|key| match key {
            ENV_BASE_URL => Some("https://env.example.org".to_string()),
            ENV_CSRF_TOKEN => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.base_url(), "https://env.example.org");
        assert_eq!(config.csrf_token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_state_dir_override() {
        let config = Config {
            state_dir: Some(PathBuf::from("/tmp/attribution-state")),
            ..Default::default()
        };
        assert_eq!(config.state_dir().unwrap(), PathBuf::from("/tmp/attribution-state"));
    }
}
