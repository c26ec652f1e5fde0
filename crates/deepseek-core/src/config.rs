//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the last used email, the preferred model class, whether
//! to persist the login, and an optional API base URL override.
//!
//! Configuration is stored at `~/.config/deepseek-chat/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::models::ModelClass;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "deepseek-chat";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Saved login response, inside the cache directory
const CREDENTIALS_FILE: &str = "login.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub last_email: Option<String>,
    #[serde(default)]
    pub model_class: ModelClass,
    #[serde(default = "default_save_login")]
    pub save_login: bool,
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_save_login() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_email: None,
            model_class: ModelClass::default(),
            save_login: default_save_login(),
            base_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
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

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Where the login response is saved when `save_login` is on
    pub fn credentials_path(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(CREDENTIALS_FILE))
    }

    pub fn api_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.save_login);
        assert_eq!(config.model_class, ModelClass::DeepseekCode);
        assert_eq!(config.api_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model_class":"deepseek_chat"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model_class, ModelClass::DeepseekChat);
        assert!(config.save_login);
        assert!(config.last_email.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = Config {
            last_email: Some("someone@example.com".to_string()),
            model_class: ModelClass::DeepseekChat,
            save_login: false,
            base_url: Some("http://localhost:8080/api/v0".to_string()),
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.api_base_url(), "http://localhost:8080/api/v0");
    }

    #[test]
    fn test_empty_base_url_falls_back() {
        let config = Config {
            base_url: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.api_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
