//! Target instance context and installed game version detection

use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// The game instance downloads are meant for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    /// Game root directory (the one holding `versions/` and `mods/`)
    pub game_dir: PathBuf,
    /// Version name inside `versions/`; blank means "no filter"
    pub version: Option<String>,
}

impl TargetContext {
    pub fn new(game_dir: impl Into<PathBuf>, version: Option<String>) -> Self {
        Self {
            game_dir: game_dir.into(),
            version,
        }
    }

    /// Version name, if present and non-blank
    pub fn version_name(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// `<game_dir>/versions/<v>/<v>.jar`
    pub fn version_jar(&self) -> Option<PathBuf> {
        self.version_name().map(|v| {
            self.game_dir
                .join("versions")
                .join(v)
                .join(format!("{}.jar", v))
        })
    }

    /// Destination for direct installs
    pub fn mods_dir(&self) -> PathBuf {
        self.game_dir.join("mods")
    }
}

/// Resolves the game version an instance runs
pub trait VersionDetector: Send + Sync {
    fn detect_installed_game_version(&self, context: &TargetContext) -> Option<String>;
}

/// Reads `version.json` embedded in the instance's client jar
#[derive(Debug, Clone, Copy, Default)]
pub struct JarVersionDetector;

impl VersionDetector for JarVersionDetector {
    fn detect_installed_game_version(&self, context: &TargetContext) -> Option<String> {
        let jar = context.version_jar()?;
        match read_jar_version(&jar) {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!("Could not read game version from {:?}: {}", jar, e);
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct EmbeddedVersion {
    id: Option<String>,
    name: Option<String>,
}

/// Game version from a client jar, `Ok(None)` when the jar carries none
pub fn read_jar_version(jar: &Path) -> anyhow::Result<Option<String>> {
    let file = std::fs::File::open(jar)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut entry = match archive.by_name("version.json") {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    let parsed: EmbeddedVersion = serde_json::from_str(&content)?;

    Ok(parsed
        .id
        .or(parsed.name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}
