//! Turning a picked release into a concrete download request

use std::path::{Path, PathBuf};
use url::Url;

use crate::catalog::ReleaseFile;
use crate::error::DownloadError;

/// Source URL and local destination for one release file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: Url,
    pub destination: PathBuf,
    pub file_name: String,
}

impl DownloadRequest {
    /// Build a request, validating the release's download location
    pub fn for_file(
        file: &ReleaseFile,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, DownloadError> {
        let location = file
            .download_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DownloadError::InvalidDownloadLocation {
                file_name: file.file_name.clone(),
                location: String::new(),
                reason: "the catalog provides no download URL for this file".to_string(),
            })?;

        let url = Url::parse(location).map_err(|e| DownloadError::InvalidDownloadLocation {
            file_name: file.file_name.clone(),
            location: location.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidDownloadLocation {
                file_name: file.file_name.clone(),
                location: location.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self {
            url,
            destination: destination.into(),
            file_name: file.file_name.clone(),
        })
    }
}

/// Text after the last `.` of `file_name`, empty when there is none
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => "",
    }
}

/// What to offer the user when asking where to save a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDialog {
    pub title: String,
    pub initial_file_name: String,
    pub extension: String,
    /// Glob restricting selectable files, e.g. `*.jar`
    pub filter_pattern: String,
}

impl SaveDialog {
    pub fn for_file(file: &ReleaseFile) -> Self {
        let extension = file_extension(&file.file_name).to_string();
        let filter_pattern = if extension.is_empty() {
            "*".to_string()
        } else {
            format!("*.{}", extension)
        };

        Self {
            title: "Save as".to_string(),
            initial_file_name: file.file_name.clone(),
            extension,
            filter_pattern,
        }
    }
}

/// Asks the user for a save location; `None` means they cancelled
pub trait DestinationPrompt: Send + Sync {
    fn choose_destination(&self, dialog: &SaveDialog) -> Option<PathBuf>;
}

/// Decide where `file` goes.
///
/// With an explicit destination the request targets exactly that path.
/// Otherwise `prompt` is asked; a cancelled prompt yields `Ok(None)` and
/// nothing else happens.
pub fn resolve_download_target(
    file: &ReleaseFile,
    explicit_destination: Option<&Path>,
    prompt: &dyn DestinationPrompt,
) -> Result<Option<DownloadRequest>, DownloadError> {
    let destination = match explicit_destination {
        Some(path) => path.to_path_buf(),
        None => {
            let dialog = SaveDialog::for_file(file);
            match prompt.choose_destination(&dialog) {
                Some(path) => path,
                None => {
                    tracing::debug!("Destination selection cancelled for {}", file.file_name);
                    return Ok(None);
                }
            }
        }
    };

    DownloadRequest::for_file(file, destination).map(Some)
}
