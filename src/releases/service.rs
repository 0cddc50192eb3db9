//! Fetch, filter, sort and publish the release files of a project

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::ordering::{filter_compatible, normalize_target, sort_newest_first};
use super::result::ReleaseListResult;
use crate::catalog::{Catalog, Project};
use crate::versions::{TargetContext, VersionDetector};

/// Produces release lists and publishes the newest one to subscribers.
///
/// Every request takes a generation number when it is issued. A request
/// only publishes while its generation is the newest issued, so a slow
/// response for an old target never replaces the list for the current one.
pub struct ReleaseListService {
    catalog: Arc<dyn Catalog>,
    detector: Arc<dyn VersionDetector>,
    generation: AtomicU64,
    published: watch::Sender<ReleaseListResult>,
}

impl ReleaseListService {
    pub fn new(catalog: Arc<dyn Catalog>, detector: Arc<dyn VersionDetector>) -> Self {
        let (published, _) = watch::channel(ReleaseListResult::default());
        Self {
            catalog,
            detector,
            generation: AtomicU64::new(0),
            published,
        }
    }

    /// Receive every published transition
    pub fn subscribe(&self) -> watch::Receiver<ReleaseListResult> {
        self.published.subscribe()
    }

    /// Current published result
    pub fn snapshot(&self) -> ReleaseListResult {
        self.published.borrow().clone()
    }

    /// Generation of the most recently issued request
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// List the releases of `project`, filtered by `target_version` when it
    /// is present and non-blank, most recent first.
    ///
    /// Catalog failures never escape: they settle the result as failed with
    /// an empty file list.
    pub async fn list_releases(
        &self,
        project: &Project,
        target_version: Option<&str>,
    ) -> ReleaseListResult {
        let generation = self.next_generation();
        self.run(generation, project, target_version).await
    }

    /// Detect the target version and list releases in the background.
    ///
    /// The returned handle resolves to this request's own result, which may
    /// differ from the published snapshot if a newer request was issued.
    pub fn refresh(
        self: &Arc<Self>,
        project: Project,
        context: TargetContext,
    ) -> JoinHandle<ReleaseListResult> {
        let generation = self.next_generation();
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let target = service.detect_target(&context).await;
            service.run(generation, &project, target.as_deref()).await
        })
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn detect_target(&self, context: &TargetContext) -> Option<String> {
        // No version selected, nothing to detect
        context.version_name()?;

        let detector = Arc::clone(&self.detector);
        let context = context.clone();
        let detected =
            tokio::task::spawn_blocking(move || detector.detect_installed_game_version(&context))
                .await;
        match detected {
            Ok(version) => {
                if version.is_none() {
                    tracing::debug!("Game version not detected, listing all files");
                }
                version
            }
            Err(e) => {
                tracing::warn!("Game version detection task failed: {}", e);
                None
            }
        }
    }

    async fn run(
        &self,
        generation: u64,
        project: &Project,
        target_version: Option<&str>,
    ) -> ReleaseListResult {
        let target = normalize_target(target_version).map(str::to_string);

        tracing::info!(
            "Listing releases for project {} (request {}, game version {})",
            project.id,
            generation,
            target.as_deref().unwrap_or("any")
        );
        self.publish(ReleaseListResult::loading(generation, target.clone()));

        let result = match self.catalog.fetch_release_files(project).await {
            Ok(files) => {
                let total = files.len();
                let mut kept = filter_compatible(files, target.as_deref());
                sort_newest_first(&mut kept);
                tracing::debug!(
                    "Project {}: kept {} of {} files",
                    project.id,
                    kept.len(),
                    total
                );
                ReleaseListResult::ready(generation, target, kept)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch files for project {}: {}", project.id, e);
                ReleaseListResult::failed(generation, target, e.to_string())
            }
        };

        if !self.publish(result.clone()) {
            tracing::debug!(
                "Request {} superseded by request {}, {} result not published",
                generation,
                self.latest_generation(),
                result.status.as_str()
            );
        }
        result
    }

    /// Replace the snapshot unless a newer request has been issued
    fn publish(&self, result: ReleaseListResult) -> bool {
        self.published.send_if_modified(|current| {
            let latest = self.latest_generation();
            if result.generation != latest || result.generation < current.generation {
                return false;
            }
            *current = result;
            true
        })
    }
}
