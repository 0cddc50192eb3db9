//! Release listing for a single project

pub mod ordering;
pub mod present;
pub mod result;
pub mod service;

pub use present::{ProjectHeader, ReleaseRow};
pub use result::{ListStatus, ReleaseListResult};
pub use service::ReleaseListService;
