//! URL source aggregation.
//!
//! All `-i` inputs, in the order given, followed by the positional arguments
//! are concatenated into one newline-delimited stream that the dispatch loop
//! reads exactly once. A newline is injected after every file so the last
//! line of one source never merges with the first line of the next. Sources
//! that cannot be opened are reported and skipped.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, error, instrument};

/// Path that selects standard input instead of a file.
pub const STDIN_SOURCE: &str = "-";

/// A boxed, read-once byte source.
pub type SourceReader = Box<dyn AsyncRead + Send + Unpin>;

/// The aggregated line stream handed to the dispatch loop.
pub type UrlStream = BufReader<SourceReader>;

/// Errors opening a URL source. Never fatal to a run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input file could not be opened.
    #[error("error opening {path}: {source}")]
    Open {
        /// The path given with `-i`.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Ordered URL sources: input files first, then inline arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSources {
    files: Vec<PathBuf>,
    inline: Vec<String>,
}

impl UrlSources {
    /// Creates an empty source list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends input files (or [`STDIN_SOURCE`]) in order.
    #[must_use]
    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Appends inline URLs; they always come after every file.
    #[must_use]
    pub fn with_inline<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inline.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Registered input files.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Registered inline URLs.
    #[must_use]
    pub fn inline(&self) -> &[String] {
        &self.inline
    }

    /// True when neither files nor inline URLs were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.inline.is_empty()
    }

    /// Opens every source and concatenates them into one stream.
    ///
    /// Files that fail to open are logged and contribute nothing.
    #[instrument(skip(self), fields(files = self.files.len(), inline = self.inline.len()))]
    pub async fn open(&self) -> UrlStream {
        let mut reader: SourceReader = Box::new(tokio::io::empty());

        for path in &self.files {
            match open_source(path).await {
                Ok(source) => {
                    debug!(path = %path.display(), "opened URL source");
                    reader = Box::new(reader.chain(source).chain(Cursor::new(b"\n".to_vec())));
                }
                Err(e) => error!(error = %e, "skipping URL source"),
            }
        }

        if !self.inline.is_empty() {
            let mut joined = self.inline.join("\n");
            joined.push('\n');
            reader = Box::new(reader.chain(Cursor::new(joined.into_bytes())));
        }

        BufReader::new(reader)
    }
}

/// Opens one `-i` source; [`STDIN_SOURCE`] maps to standard input.
///
/// # Errors
///
/// Returns [`SourceError::Open`] if the file cannot be opened.
pub async fn open_source(path: &Path) -> Result<SourceReader, SourceError> {
    if path.as_os_str() == STDIN_SOURCE {
        return Ok(Box::new(tokio::io::stdin()));
    }

    let file = File::open(path).await.map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(file))
}
