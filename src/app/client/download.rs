//! Archive download with atomic writes and streaming
//!
//! The build archive is fetched in two steps: the API hands out a short-lived
//! signed link, then the archive itself is streamed from that link into a
//! temporary file which is renamed onto the destination once complete.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::app::client::Endpoints;
use crate::app::models::{BuildId, BuildProgress, DownloadLink, Envelope};
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// Archive download handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
    storage_client: &'a Client,
    endpoints: &'a Endpoints,
    progress: &'a BuildProgress,
}

impl<'a> DownloadHandler<'a> {
    pub fn new(
        http_handler: &'a HttpHandler,
        storage_client: &'a Client,
        endpoints: &'a Endpoints,
        progress: &'a BuildProgress,
    ) -> Self {
        Self {
            http_handler,
            storage_client,
            endpoints,
            progress,
        }
    }

    /// Downloads the archive of `build_id` to `destination`
    ///
    /// An existing file at `destination` is replaced.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The download link cannot be obtained
    /// - The archive transfer fails or is truncated
    /// - File I/O operations fail
    pub async fn download_build(&self, build_id: BuildId, destination: &Path) -> DownloadResult<()> {
        let link = self.download_link(build_id).await?;
        let url = Url::parse(&link.url).map_err(|e| DownloadError::InvalidUrl {
            url: link.url.clone(),
            error: e.to_string(),
        })?;
        tracing::debug!(
            "Download link for build {} expires at {:?}",
            build_id,
            link.expire_in
        );

        // Create parent directory if it doesn't exist
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_path_for(destination);

        if let Err(e) = self.stream_to(&url, &temp_path).await {
            // Clean up temp file on failure
            if temp_path.exists() {
                let _ = tokio::fs::remove_file(&temp_path).await;
            }
            tracing::error!("Download of build {} failed: {}", build_id, e);
            return Err(e);
        }

        // Atomic move from temp file to final destination
        tokio::fs::rename(&temp_path, destination)
            .await
            .map_err(|_e| DownloadError::AtomicOperationFailed {
                temp_path: temp_path.clone(),
                final_path: destination.to_path_buf(),
            })?;

        tracing::info!("Successfully downloaded: {}", destination.display());
        Ok(())
    }

    async fn download_link(&self, build_id: BuildId) -> DownloadResult<DownloadLink> {
        let url = self.endpoints.build_download(build_id)?;
        let link: Envelope<DownloadLink> = self.http_handler.get_json(&url).await?;
        Ok(link.data)
    }

    /// Streams the archive into `temp_path`, tracking progress when the
    /// server announces a content length
    async fn stream_to(&self, url: &Url, temp_path: &Path) -> DownloadResult<()> {
        let response = self.storage_client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let expected = response.content_length();
        self.progress.set(0);

        let mut file = File::create(temp_path).await?;
        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            if let Some(total) = expected {
                self.progress.set_fraction(received, total);
            }
        }

        file.flush().await?;

        if let Some(expected) = expected {
            if received != expected {
                return Err(DownloadError::IncompleteDownload { received, expected });
            }
        }

        self.progress.set(100);
        tracing::debug!("Received {} bytes into {}", received, temp_path.display());
        Ok(())
    }
}

/// `out.zip` -> `out.zip.tmp`, `out` -> `out.tmp`
pub(crate) fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(files::TEMP_FILE_SUFFIX);
    PathBuf::from(name)
}
