//! modshelf - browse and download mod releases for a game instance
//!
//! This crate provides:
//! - A CurseForge catalog client behind the `Catalog` trait
//! - A release list service that filters files by the instance's game
//!   version, orders them newest first and publishes loading/ready/failed
//!   snapshots to subscribers
//! - Download target resolution with install and save-as sinks
//! - Game version detection from a client jar

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod releases;
pub mod versions;

pub use app::App;
pub use catalog::{Catalog, CurseForgeClient, Project, ReleaseFile, ReleaseType};
pub use config::Config;
pub use download::{resolve_download_target, DownloadRequest, DownloadSink};
pub use error::{CatalogError, DownloadError};
pub use releases::{ListStatus, ReleaseListResult, ReleaseListService};
pub use versions::{TargetContext, VersionDetector};
