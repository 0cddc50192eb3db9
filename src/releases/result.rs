//! Release list result and its lifecycle status

use crate::catalog::ReleaseFile;

/// Lifecycle of a release list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl ListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStatus::Idle => "idle",
            ListStatus::Loading => "loading",
            ListStatus::Ready => "ready",
            ListStatus::Failed => "failed",
        }
    }

    /// Once settled, a result never changes again
    pub fn is_final(&self) -> bool {
        matches!(self, ListStatus::Ready | ListStatus::Failed)
    }

    /// Generic retry affordance shown for a failed list
    pub fn failure_hint(&self) -> Option<&'static str> {
        match self {
            ListStatus::Failed => Some("Failed to load the file list. Refresh to try again."),
            _ => None,
        }
    }
}

/// Outcome of one release list request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseListResult {
    /// Request number that produced this result
    pub generation: u64,
    pub status: ListStatus,
    /// Game version the files were filtered by, if any
    pub target_version: Option<String>,
    /// Most recent first
    pub files: Vec<ReleaseFile>,
    /// Catalog error message when `status` is `Failed`
    pub error: Option<String>,
}

impl ReleaseListResult {
    pub(crate) fn loading(generation: u64, target_version: Option<String>) -> Self {
        Self {
            generation,
            status: ListStatus::Loading,
            target_version,
            files: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn ready(
        generation: u64,
        target_version: Option<String>,
        files: Vec<ReleaseFile>,
    ) -> Self {
        Self {
            generation,
            status: ListStatus::Ready,
            target_version,
            files,
            error: None,
        }
    }

    pub(crate) fn failed(generation: u64, target_version: Option<String>, error: String) -> Self {
        Self {
            generation,
            status: ListStatus::Failed,
            target_version,
            files: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ListStatus::Failed
    }
}
