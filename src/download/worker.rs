//! The unit of concurrent work: one URL fetched and written to one file.
//!
//! The [`Transfer`] trait is the seam between the dispatch loop and the code
//! that actually moves bytes, so the engine can be driven by other transfer
//! implementations in tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};
use url::Url;

use super::client::{HttpClient, parse_http_url};
use super::error::DownloadError;
use super::filename::{ClaimedNames, resolve_destination};

/// Performs one URL-to-file transfer.
///
/// # Object Safety
///
/// Uses `async_trait` so the engine can hold an `Arc<dyn Transfer>`.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Downloads `url` and returns the path written to.
    async fn transfer(&self, url: &str) -> Result<PathBuf, DownloadError>;
}

/// Downloads URLs into a destination directory over a shared [`HttpClient`].
///
/// Holds only read-only run configuration plus the claimed-name registry, so a
/// single instance behind an `Arc` serves every task of a run.
#[derive(Debug)]
pub struct Downloader {
    client: HttpClient,
    output_dir: PathBuf,
    user_agent: Option<String>,
    overwrite: bool,
    claimed: Arc<ClaimedNames>,
}

impl Downloader {
    /// Creates a downloader writing into `output_dir` that never overwrites
    /// existing files and sends the client's default User-Agent.
    #[must_use]
    pub fn new(client: HttpClient, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            user_agent: None,
            overwrite: false,
            claimed: Arc::new(ClaimedNames::new()),
        }
    }

    /// Sets the User-Agent override sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Overwrite same-named files instead of picking `stem-N.ext`.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Resolves and claims the destination for `url` on the blocking pool,
    /// since it probes the filesystem while holding the registry lock.
    async fn resolve_path(&self, url: Url) -> Result<PathBuf, DownloadError> {
        let dir = self.output_dir.clone();
        let claimed = Arc::clone(&self.claimed);
        let avoid_overwrite = !self.overwrite;

        tokio::task::spawn_blocking(move || {
            resolve_destination(&dir, &url, avoid_overwrite, &claimed)
        })
        .await
        .map_err(|e| DownloadError::create_file(&self.output_dir, std::io::Error::other(e)))
    }
}

#[async_trait]
impl Transfer for Downloader {
    #[instrument(skip(self), fields(url = %url))]
    async fn transfer(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let parsed = parse_http_url(url)?;

        let response = self.client.get(&parsed, self.user_agent.as_deref()).await?;

        let path = self.resolve_path(parsed).await?;
        debug!(path = %path.display(), "resolved output path");

        // On error the response is dropped here, which releases the connection.
        let mut file = File::create(&path)
            .await
            .map_err(|e| DownloadError::create_file(&path, e))?;

        let path = match std::path::absolute(&path) {
            Ok(absolute) => absolute,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not resolve absolute path");
                path
            }
        };

        // Partial files are left in place on failure.
        let bytes = stream_to_file(&mut file, response, url, &path).await?;
        debug!(path = %path.display(), bytes, "download complete");

        Ok(path)
    }
}

/// Streams the response body to `file`, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::write(url, file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::write(url, file_path, e))?;

    Ok(bytes_written)
}
