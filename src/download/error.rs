//! Error types for the download module.
//!
//! Every variant carries the URL or path it concerns so a single log line is
//! enough to tell which task failed and where.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a single download task.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The URL could not be turned into an HTTP request.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS, reset mid-body).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The connection could not be established within the connect timeout.
    #[error("timeout connecting to {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The destination file could not be created.
    #[error("error creating file {path}: {source}")]
    CreateFile {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the body to the destination file failed.
    #[error("error writing {url} to {path}: {source}")]
    Write {
        /// The URL being downloaded.
        url: String,
        /// The partially written file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a network error, promoting timeouts to [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a file creation error.
    pub fn create_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a mid-transfer write error.
    pub fn write(url: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            url: url.into(),
            path: path.into(),
            source,
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the
// url or path context that the source errors lack.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url", "relative URL without a base");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
        assert!(msg.contains("relative URL"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_download_error_create_file_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::create_file(PathBuf::from("/tmp/test.pdf"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/test.pdf"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }

    #[test]
    fn test_download_error_write_display_names_url_and_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let error = DownloadError::write("https://example.com/a.iso", "/data/a.iso", io_error);
        let msg = error.to_string();
        assert!(msg.contains("https://example.com/a.iso"), "Expected URL in: {msg}");
        assert!(msg.contains("/data/a.iso"), "Expected path in: {msg}");
    }

    #[test]
    fn test_download_error_display_is_single_line() {
        let error = DownloadError::invalid_url("ftp://example.com/x", "unsupported scheme ftp");
        assert!(!error.to_string().contains('\n'));
    }
}
