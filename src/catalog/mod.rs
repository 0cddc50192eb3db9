//! Remote mod catalog integration

pub mod curseforge;
pub mod types;

pub use curseforge::CurseForgeClient;
pub use types::{Badge, Category, Project, ReleaseFile, ReleaseType};

use async_trait::async_trait;

use crate::error::CatalogError;

/// Source of release files for a project.
///
/// Returned files are in catalog order; callers sort and filter them.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_release_files(
        &self,
        project: &Project,
    ) -> Result<Vec<ReleaseFile>, CatalogError>;
}
