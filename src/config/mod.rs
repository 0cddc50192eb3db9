//! Configuration management for modshelf
//!
//! Uses XDG-compliant paths:
//! - Config: ~/.config/modshelf/config.toml
//! - Data: ~/.local/share/modshelf/

mod paths;

pub use paths::Paths;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "CURSEFORGE_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://api.curseforge.com/v1";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CurseForge API key
    pub curseforge_api_key: Option<String>,

    /// Catalog API base URL
    pub api_base: String,

    /// Files requested per catalog page
    pub page_size: u32,

    /// HTTP timeout for catalog requests
    pub request_timeout_secs: u64,

    /// Game directory used when none is passed on the command line
    pub default_game_dir: Option<String>,

    /// Override for the save-as downloads directory
    pub downloads_dir_override: Option<String>,

    /// Paths configuration
    #[serde(skip)]
    pub paths: Paths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curseforge_api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: 50,
            request_timeout_secs: 30,
            default_game_dir: None,
            downloads_dir_override: None,
            paths: Paths::new(),
        }
    }
}

impl Config {
    /// API key from the environment, then from the config file
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.curseforge_api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Resolve configured downloads directory (override or default XDG path)
    pub fn downloads_dir(&self) -> PathBuf {
        self.downloads_dir_override
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.paths.downloads_dir())
    }

    pub fn default_game_dir(&self) -> Option<PathBuf> {
        self.default_game_dir.as_deref().map(PathBuf::from)
    }

    /// Reject values that would break catalog requests
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > 50 {
            bail!(
                "Invalid page_size {}. CurseForge accepts 1 to 50 files per page",
                self.page_size
            );
        }
        url::Url::parse(&self.api_base)
            .with_context(|| format!("Invalid api_base '{}'", self.api_base))?;
        Ok(())
    }

    /// Ensure required directories exist, including overrides.
    pub fn ensure_dirs(&self) -> Result<()> {
        self.paths
            .ensure_dirs()
            .context("Failed to create default application directories")?;
        std::fs::create_dir_all(self.downloads_dir())
            .context("Failed to create downloads directory")?;
        Ok(())
    }

    /// Load configuration from disk or create default
    pub async fn load() -> Result<Self> {
        Self::load_from(Paths::new()).await
    }

    /// Load configuration using an explicit path layout
    pub async fn load_from(paths: Paths) -> Result<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::read_file(&config_path).await?
        } else {
            // Create default config
            let config = Config {
                paths: paths.clone(),
                ..Config::default()
            };
            config.save().await?;
            config
        };

        config.paths = paths;
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub async fn save(&self) -> Result<()> {
        let config_path = self.paths.config_file();

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }
}
