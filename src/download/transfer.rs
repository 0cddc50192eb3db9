//! Moving release bytes from the network to disk

use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use super::request::DownloadRequest;
use crate::error::DownloadError;

/// Progress callback
/// Parameters: (bytes_downloaded, total_bytes) where total is 0 when unknown
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Executes download requests
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Fetch `request.url` into `request.destination`, returning bytes written
    async fn start_download(
        &self,
        request: &DownloadRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, DownloadError>;
}

/// Streams downloads over HTTP
#[derive(Clone)]
pub struct HttpTransfer {
    client: reqwest::Client,
}

impl HttpTransfer {
    pub fn new(timeout: Option<Duration>) -> Result<Self, DownloadError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("modshelf/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

/// `<destination>.part`, renamed over the destination once complete
fn partial_path(request: &DownloadRequest) -> PathBuf {
    let mut name = request
        .destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| request.file_name.clone().into());
    name.push(".part");
    request.destination.with_file_name(name)
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn start_download(
        &self,
        request: &DownloadRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, DownloadError> {
        let dest = &request.destination;

        // Ensure parent dir exists
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        tracing::info!("Downloading {} -> {:?}", request.url, dest);

        let response = self.client.get(request.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: request.url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_size = response.content_length().unwrap_or(0);
        let part = partial_path(request);

        let written = async {
            let mut file = tokio::fs::File::create(&part)
                .await
                .map_err(|e| DownloadError::io(&part, e))?;

            let mut downloaded: u64 = 0;
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| DownloadError::io(&part, e))?;
                downloaded += chunk.len() as u64;
                if let Some(cb) = &progress {
                    cb(downloaded, total_size);
                }
            }

            file.flush().await.map_err(|e| DownloadError::io(&part, e))?;
            // Close the handle before the rename
            drop(file);

            tokio::fs::rename(&part, dest)
                .await
                .map_err(|e| DownloadError::io(dest, e))?;
            Ok::<u64, DownloadError>(downloaded)
        }
        .await;

        let downloaded = match written {
            Ok(downloaded) => downloaded,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        };

        tracing::debug!("Downloaded {} bytes to {:?}", downloaded, dest);
        Ok(downloaded)
    }
}
