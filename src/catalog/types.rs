//! Catalog data model shared by the service, downloads and presentation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mod project as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub summary: String,
    pub categories: Vec<Category>,
    pub website_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Project {
    /// Bare project reference when only the id is known
    pub fn with_id(id: u64) -> Self {
        Self {
            id,
            name: format!("Project {}", id),
            summary: String::new(),
            categories: Vec::new(),
            website_url: None,
            thumbnail_url: None,
        }
    }
}

/// Category tag attached to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// One downloadable build of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub id: u64,
    pub file_name: String,
    pub display_name: String,
    pub game_versions: Vec<String>,
    pub released_at: DateTime<Utc>,
    pub release_type: ReleaseType,
    /// Absent when the author disabled third-party distribution
    pub download_url: Option<String>,
}

impl ReleaseFile {
    /// Exact, case-sensitive match against the catalog's version tags
    pub fn supports(&self, game_version: &str) -> bool {
        self.game_versions.iter().any(|v| v == game_version)
    }
}

/// Stability tier of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    #[default]
    Release,
    Beta,
    Alpha,
}

impl ReleaseType {
    /// Map the catalog's numeric code (1 release, 2 beta, 3 alpha)
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => ReleaseType::Beta,
            3 => ReleaseType::Alpha,
            _ => ReleaseType::Release,
        }
    }

    /// Icon and tag shown next to a release.
    ///
    /// Beta and alpha builds share the "snapshot" tag and differ only by icon.
    pub fn badge(&self) -> Badge {
        match self {
            ReleaseType::Release => Badge {
                icon: "release-circle-outline",
                tag: "release",
            },
            ReleaseType::Beta => Badge {
                icon: "beta-circle-outline",
                tag: "snapshot",
            },
            ReleaseType::Alpha => Badge {
                icon: "alpha-circle-outline",
                tag: "snapshot",
            },
        }
    }
}

/// Presentation hint for a release classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub icon: &'static str,
    pub tag: &'static str,
}
