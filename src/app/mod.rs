//! Application orchestration for the command line

mod actions;
mod prompt;

pub use prompt::TerminalPrompt;

use crate::catalog::CurseForgeClient;
use crate::config::Config;
use crate::releases::ReleaseListService;
use crate::versions::{JarVersionDetector, TargetContext};

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Main application struct that wires configuration, catalog and services
pub struct App {
    /// Application configuration
    pub config: Config,

    /// CurseForge client (optional, requires API key)
    pub catalog: Option<Arc<CurseForgeClient>>,

    /// Release list service backed by `catalog`
    pub releases: Option<Arc<ReleaseListService>>,
}

impl App {
    /// Create a new App instance
    pub async fn new(config: Config) -> Result<Self> {
        // Ensure directories exist
        config.ensure_dirs().context("Failed to create directories")?;

        let catalog = config.api_key().and_then(|key| {
            CurseForgeClient::new(
                &key,
                &config.api_base,
                config.page_size,
                config.request_timeout(),
            )
            .map(Arc::new)
            .map_err(|e| {
                tracing::warn!("Failed to initialize CurseForge client: {}", e);
                e
            })
            .ok()
        });

        let releases = catalog.as_ref().map(|client| {
            Arc::new(ReleaseListService::new(
                client.clone(),
                Arc::new(JarVersionDetector),
            ))
        });

        Ok(Self {
            config,
            catalog,
            releases,
        })
    }

    /// Catalog client, or an error explaining how to configure one
    pub fn catalog(&self) -> Result<Arc<CurseForgeClient>> {
        self.catalog
            .clone()
            .ok_or(crate::error::CatalogError::MissingApiKey)
            .map_err(Into::into)
    }

    pub fn release_service(&self) -> Result<Arc<ReleaseListService>> {
        self.releases
            .clone()
            .ok_or(crate::error::CatalogError::MissingApiKey)
            .map_err(Into::into)
    }

    /// Target instance from CLI flags, falling back to the configured game dir.
    ///
    /// A version name needs a game directory to be detected in.
    pub fn target_context(
        &self,
        game_dir: Option<&str>,
        version: Option<&str>,
    ) -> Result<Option<TargetContext>> {
        let game_dir = game_dir
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.config.default_game_dir());

        match (game_dir, version) {
            (Some(game_dir), version) => Ok(Some(TargetContext::new(
                game_dir,
                version.map(str::to_string),
            ))),
            (None, Some(version)) if !version.trim().is_empty() => bail!(
                "--version-name {} needs a game directory \
                 (--game-dir or `modshelf config set-game-dir`)",
                version
            ),
            (None, _) => Ok(None),
        }
    }
}
