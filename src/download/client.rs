//! HTTP client wrapper for downloading files.
//!
//! This module provides the `HttpClient` struct, a cheaply cloneable handle over
//! one pooled `reqwest::Client` shared by every download task of a run.

use reqwest::header::USER_AGENT;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client for downloading files with streaming support.
///
/// Create it once and clone it into tasks; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use batchget::download::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let url = batchget::download::parse_http_url("https://example.com/file.pdf")?;
/// let response = client.get(&url, None).await?;
/// println!("status: {}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// Configuration:
    /// - Connect timeout: 30 seconds, no overall timeout
    /// - Gzip decompression: enabled
    /// - Redirects: reqwest default policy
    /// - User-Agent: `batchget/<version>` unless a request overrides it
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with an explicit connect timeout.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Sends a GET request for an already validated `url`, optionally
    /// overriding the User-Agent.
    ///
    /// Only transport failures are errors. A non-success status is logged and
    /// the response is returned so its body can still be saved.
    ///
    /// # Errors
    ///
    /// [`DownloadError::Network`] / [`DownloadError::Timeout`] on transport failure.
    #[instrument(level = "debug", skip(self, user_agent), fields(url = %url))]
    pub async fn get(&self, url: &Url, user_agent: Option<&str>) -> Result<Response, DownloadError> {
        let mut request = self.client.get(url.clone());
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "response received");
        } else {
            warn!(url = %url, status = status.as_u16(), "server returned non-success status, saving body anyway");
        }

        Ok(response)
    }
}

/// Parses `url` and rejects anything that is not `http` or `https`.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] with the parser's reason.
pub fn parse_http_url(url: &str) -> Result<Url, DownloadError> {
    let parsed = Url::parse(url).map_err(|e| DownloadError::invalid_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(DownloadError::invalid_url(
            url,
            format!("unsupported scheme {other}"),
        )),
    }
}
