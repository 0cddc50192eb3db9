//! Compatibility filtering and recency ordering of release files

use std::cmp::Ordering;

use crate::catalog::ReleaseFile;

/// Trimmed target version, `None` when absent or blank
pub fn normalize_target(target_version: Option<&str>) -> Option<&str> {
    target_version.map(str::trim).filter(|v| !v.is_empty())
}

/// Keep files compatible with `target_version`; no target keeps everything
pub fn filter_compatible(
    files: Vec<ReleaseFile>,
    target_version: Option<&str>,
) -> Vec<ReleaseFile> {
    match normalize_target(target_version) {
        Some(version) => files.into_iter().filter(|f| f.supports(version)).collect(),
        None => files,
    }
}

/// Newest first, then higher file id first
pub fn newest_first(a: &ReleaseFile, b: &ReleaseFile) -> Ordering {
    b.released_at
        .cmp(&a.released_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Stable sort, so exact duplicates keep catalog order
pub fn sort_newest_first(files: &mut [ReleaseFile]) {
    files.sort_by(newest_first);
}
