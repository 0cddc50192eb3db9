//! Toolkit-independent view models for a project and its releases

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

use crate::catalog::{Project, ReleaseFile};

/// Header card shown above the release list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectHeader {
    pub title: String,
    pub subtitle: String,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub website_url: Option<String>,
}

impl From<&Project> for ProjectHeader {
    fn from(project: &Project) -> Self {
        Self {
            title: project.name.clone(),
            subtitle: project.summary.clone(),
            tags: project.categories.iter().map(|c| c.name.clone()).collect(),
            thumbnail_url: project.thumbnail_url.clone(),
            website_url: project.website_url.clone(),
        }
    }
}

/// One entry of the release list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRow {
    pub file_id: u64,
    pub title: String,
    pub subtitle: String,
    /// Game versions followed by the classification tag
    pub tags: Vec<String>,
    pub icon: &'static str,
}

impl ReleaseRow {
    /// Row with the release date rendered in `tz`
    pub fn in_zone<Tz>(file: &ReleaseFile, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let badge = file.release_type.badge();
        let mut tags = file.game_versions.clone();
        tags.push(badge.tag.to_string());

        Self {
            file_id: file.id,
            title: file.display_name.clone(),
            subtitle: format_release_date(&file.released_at, tz),
            tags,
            icon: badge.icon,
        }
    }
}

impl From<&ReleaseFile> for ReleaseRow {
    fn from(file: &ReleaseFile) -> Self {
        Self::in_zone(file, &Local)
    }
}

/// Long-form release date, e.g. "Thursday, June 1, 2023 14:05"
pub fn format_release_date<Tz>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.with_timezone(tz)
        .format("%A, %B %-d, %Y %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, ReleaseType};

    #[test]
    fn test_release_row() {
        let file = ReleaseFile {
            id: 42,
            file_name: "sodium-fabric-0.4.10.jar".to_string(),
            display_name: "Sodium 0.4.10".to_string(),
            game_versions: vec!["1.19.2".to_string(), "Fabric".to_string()],
            released_at: Utc.with_ymd_and_hms(2023, 6, 1, 14, 5, 0).unwrap(),
            release_type: ReleaseType::Beta,
            download_url: None,
        };

        let row = ReleaseRow::in_zone(&file, &Utc);
        assert_eq!(row.title, "Sodium 0.4.10");
        assert_eq!(row.subtitle, "Thursday, June 1, 2023 14:05");
        assert_eq!(row.tags, vec!["1.19.2", "Fabric", "snapshot"]);
        assert_eq!(row.icon, "beta-circle-outline");
    }

    #[test]
    fn test_project_header() {
        let project = Project {
            id: 1,
            name: "JEI".to_string(),
            summary: "View items and recipes".to_string(),
            categories: vec![Category {
                id: 421,
                name: "API and Library".to_string(),
            }],
            website_url: Some("https://www.curseforge.com/minecraft/mc-mods/jei".to_string()),
            thumbnail_url: None,
        };

        let header = ProjectHeader::from(&project);
        assert_eq!(header.title, "JEI");
        assert_eq!(header.tags, vec!["API and Library"]);
        assert!(header.website_url.is_some());
    }
}
