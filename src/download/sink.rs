//! Where a picked release ends up

use std::path::{Path, PathBuf};

use super::request::{resolve_download_target, DestinationPrompt, DownloadRequest};
use crate::catalog::ReleaseFile;
use crate::error::DownloadError;

/// Strategy turning a picked release into a download request.
///
/// `Ok(None)` means the user backed out and nothing should happen.
pub trait DownloadSink: Send + Sync {
    fn plan(&self, file: &ReleaseFile) -> Result<Option<DownloadRequest>, DownloadError>;
}

/// Drops the file straight into an instance's mods directory
#[derive(Debug, Clone)]
pub struct InstallSink {
    mods_dir: PathBuf,
}

impl InstallSink {
    pub fn new(mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
        }
    }
}

impl DownloadSink for InstallSink {
    fn plan(&self, file: &ReleaseFile) -> Result<Option<DownloadRequest>, DownloadError> {
        // Only the last component, a catalog file name must not escape mods/
        let name = Path::new(&file.file_name)
            .file_name()
            .ok_or_else(|| DownloadError::InvalidDownloadLocation {
                file_name: file.file_name.clone(),
                location: file.download_url.clone().unwrap_or_default(),
                reason: "file name is not usable as a destination".to_string(),
            })?;

        DownloadRequest::for_file(file, self.mods_dir.join(name)).map(Some)
    }
}

/// Saves wherever the user says, or to a fixed path when one was given
pub struct SaveAsSink<P> {
    destination: Option<PathBuf>,
    prompt: P,
}

impl<P: DestinationPrompt> SaveAsSink<P> {
    pub fn new(prompt: P) -> Self {
        Self {
            destination: None,
            prompt,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

impl<P: DestinationPrompt> DownloadSink for SaveAsSink<P> {
    fn plan(&self, file: &ReleaseFile) -> Result<Option<DownloadRequest>, DownloadError> {
        resolve_download_target(file, self.destination.as_deref(), &self.prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReleaseType;
    use crate::download::SaveDialog;
    use chrono::Utc;

    fn release(file_name: &str) -> ReleaseFile {
        ReleaseFile {
            id: 9,
            file_name: file_name.to_string(),
            display_name: file_name.to_string(),
            game_versions: Vec::new(),
            released_at: Utc::now(),
            release_type: ReleaseType::Alpha,
            download_url: Some("https://edge.forgecdn.net/files/9/9/x.jar".to_string()),
        }
    }

    struct DirPrompt(PathBuf);

    impl DestinationPrompt for DirPrompt {
        fn choose_destination(&self, dialog: &SaveDialog) -> Option<PathBuf> {
            Some(self.0.join(&dialog.initial_file_name))
        }
    }

    struct CancelPrompt;

    impl DestinationPrompt for CancelPrompt {
        fn choose_destination(&self, _dialog: &SaveDialog) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_install_sink_targets_mods_dir() {
        let sink = InstallSink::new("/games/mc/mods");
        let request = sink.plan(&release("create-0.5.1.jar")).unwrap().unwrap();
        assert_eq!(request.destination, PathBuf::from("/games/mc/mods/create-0.5.1.jar"));
    }

    #[test]
    fn test_install_sink_strips_directories() {
        let sink = InstallSink::new("/games/mc/mods");
        let request = sink.plan(&release("../../evil.jar")).unwrap().unwrap();
        assert_eq!(request.destination, PathBuf::from("/games/mc/mods/evil.jar"));
    }

    #[test]
    fn test_save_as_sink_uses_prompt() {
        let sink = SaveAsSink::new(DirPrompt(PathBuf::from("/home/me/Downloads")));
        let request = sink.plan(&release("create-0.5.1.jar")).unwrap().unwrap();
        assert_eq!(
            request.destination,
            PathBuf::from("/home/me/Downloads/create-0.5.1.jar")
        );
    }

    #[test]
    fn test_save_as_sink_fixed_destination() {
        let sink = SaveAsSink::new(CancelPrompt).with_destination("/tmp/out.jar");
        let request = sink.plan(&release("create-0.5.1.jar")).unwrap().unwrap();
        assert_eq!(request.destination, PathBuf::from("/tmp/out.jar"));
    }

    #[test]
    fn test_save_as_sink_cancelled() {
        let sink = SaveAsSink::new(CancelPrompt);
        assert!(sink.plan(&release("create-0.5.1.jar")).unwrap().is_none());
    }
}
