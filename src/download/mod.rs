//! Download target resolution, sinks and transfers

pub mod request;
pub mod sink;
pub mod transfer;

pub use request::{
    file_extension, resolve_download_target, DestinationPrompt, DownloadRequest, SaveDialog,
};
pub use sink::{DownloadSink, InstallSink, SaveAsSink};
pub use transfer::{HttpTransfer, ProgressCallback, Transfer};

use crate::catalog::ReleaseFile;
use crate::error::DownloadError;

/// Plan `file` with `sink` and run the transfer.
///
/// Returns the request that was executed, or `None` if the sink produced
/// none (the user cancelled).
pub async fn deliver(
    sink: &dyn DownloadSink,
    transfer: &dyn Transfer,
    file: &ReleaseFile,
    progress: Option<ProgressCallback>,
) -> Result<Option<DownloadRequest>, DownloadError> {
    let Some(request) = sink.plan(file)? else {
        return Ok(None);
    };

    transfer.start_download(&request, progress).await?;
    Ok(Some(request))
}
