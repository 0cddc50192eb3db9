//! XDG-compliant path management

use directories::ProjectDirs;
use std::path::PathBuf;

/// Manages all application paths using XDG base directory specification
#[derive(Debug, Clone)]
pub struct Paths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    /// Create a new Paths instance.
    ///
    /// Falls back to `./.modshelf` when no home directory can be resolved.
    pub fn new() -> Self {
        match ProjectDirs::from("", "", "modshelf") {
            Some(dirs) => Self {
                config_dir: dirs.config_dir().to_path_buf(),
                data_dir: dirs.data_dir().to_path_buf(),
            },
            None => Self::rooted_at(PathBuf::from(".modshelf")),
        }
    }

    /// Place every directory below a single root (portable installs, tests)
    pub fn rooted_at(root: PathBuf) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    // ========== Config Paths ==========

    /// Config directory: ~/.config/modshelf/
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Main config file: ~/.config/modshelf/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    // ========== Data Paths ==========

    /// Data directory: ~/.local/share/modshelf/
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    /// Downloads directory: ~/.local/share/modshelf/downloads/
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir().join("downloads")
    }

    /// Log file: ~/.local/share/modshelf/modshelf.log
    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("modshelf.log")
    }

    // ========== Utility Methods ==========

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.config_dir())?;
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.downloads_dir())?;
        Ok(())
    }
}
