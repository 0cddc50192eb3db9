//! Error types for catalog access and downloads

use std::path::PathBuf;
use thiserror::Error;

/// Failure while retrieving data from the remote catalog.
///
/// The release list service never propagates this to its caller; it is
/// turned into a failed status on the published result.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited after {0} retries")]
    RateLimited(u32),

    #[error("Failed to parse catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("CurseForge API key is not configured (set CURSEFORGE_API_KEY or run `modshelf config set-api-key`)")]
    MissingApiKey,
}

/// Failure while building or executing a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid download location for {file_name} ({location}): {reason}")]
    InvalidDownloadLocation {
        file_name: String,
        location: String,
        reason: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DownloadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Io {
            path: path.into(),
            source,
        }
    }
}
