//! Immutable run configuration.
//!
//! Raw flag values are normalised once into a [`RunConfig`] that is then passed
//! by reference to everything that needs it; nothing reads flags globally.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::download::WaitStrategy;
use crate::input::UrlSources;
use crate::user_agent;

/// Default number of concurrent downloads.
pub const DEFAULT_CONNECTIONS: i64 = 1;

/// Flag values as given on the command line, before normalisation.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RawConfig {
    /// `-c`: requested concurrency, may be zero or negative.
    pub connections: i64,
    /// `-over`: overwrite same-named files.
    pub overwrite: bool,
    /// `-dest`: destination directory.
    pub dest_dir: PathBuf,
    /// `-random-agent`: pick a browser User-Agent for the run.
    pub random_agent: bool,
    /// `-custom-agent`: explicit User-Agent, empty means unset.
    pub custom_agent: Option<String>,
    /// `-wait`: seconds between dispatches, may be negative.
    pub wait_secs: i64,
    /// `-random-wait`: randomise the wait in `[0, wait]`.
    pub random_wait: bool,
    /// `-i`: input files in the order given.
    pub input_files: Vec<PathBuf>,
    /// Positional URLs.
    pub urls: Vec<String>,
    /// `-q`: suppress success confirmations.
    pub quiet: bool,
}

/// Normalised settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Concurrency cap, at least 1.
    pub connections: usize,
    /// Overwrite same-named files instead of disambiguating.
    pub overwrite: bool,
    /// Destination directory; becomes the working directory.
    pub dest_dir: PathBuf,
    /// User-Agent override for every request.
    pub user_agent: Option<String>,
    /// True when `user_agent` was drawn from the browser list.
    pub random_user_agent: bool,
    /// Pacing between dispatches.
    pub wait: WaitStrategy,
    /// Where URLs are read from.
    pub sources: UrlSources,
    /// Print a confirmation for every finished download.
    pub report_success: bool,
}

impl RunConfig {
    /// Normalises `raw` using the thread-local RNG for the random User-Agent.
    #[must_use]
    pub fn from_raw(raw: RawConfig) -> Self {
        Self::from_raw_with_rng(raw, &mut rand::thread_rng())
    }

    /// Normalises `raw`, drawing the random User-Agent from `rng`.
    ///
    /// - `connections <= 0` becomes 1
    /// - `wait_secs < 0` becomes 0
    /// - a non-empty custom agent beats `-random-agent`
    #[must_use]
    pub fn from_raw_with_rng<R: rand::Rng + ?Sized>(raw: RawConfig, rng: &mut R) -> Self {
        let connections = usize::try_from(raw.connections)
            .ok()
            .filter(|c| *c > 0)
            .unwrap_or(1);
        let wait_secs = u64::try_from(raw.wait_secs).unwrap_or(0);

        let user_agent =
            user_agent::select_user_agent(raw.custom_agent.as_deref(), raw.random_agent, rng);
        let custom_given = raw
            .custom_agent
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        let random_user_agent = user_agent.is_some() && raw.random_agent && !custom_given;

        let dest_dir = if raw.dest_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            raw.dest_dir
        };

        let config = Self {
            connections,
            overwrite: raw.overwrite,
            dest_dir,
            user_agent,
            random_user_agent,
            wait: WaitStrategy::from_settings(wait_secs, raw.random_wait),
            sources: UrlSources::new()
                .with_files(raw.input_files)
                .with_inline(raw.urls),
            report_success: !raw.quiet,
        };
        debug!(?config, "run configuration resolved");
        config
    }
}

/// Errors preparing the destination directory. These end the process.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The directory (or a parent) could not be created.
    #[error("error creating destination directory {path}: {source}")]
    CreateDir {
        /// Requested destination.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The directory exists but could not be made the working directory.
    #[error("error changing working directory to {path}: {source}")]
    EnterDir {
        /// Requested destination.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Creates `dest_dir` with all parents if needed and makes it the process
/// working directory. `.` is left untouched.
///
/// # Errors
///
/// Returns [`SetupError`] if the directory cannot be created or entered.
pub fn prepare_destination(dest_dir: &Path) -> Result<(), SetupError> {
    if dest_dir == Path::new(".") {
        return Ok(());
    }

    if !dest_dir.is_dir() {
        std::fs::create_dir_all(dest_dir).map_err(|source| SetupError::CreateDir {
            path: dest_dir.to_path_buf(),
            source,
        })?;
        debug!(path = %dest_dir.display(), "created destination directory");
    }

    std::env::set_current_dir(dest_dir).map_err(|source| SetupError::EnterDir {
        path: dest_dir.to_path_buf(),
        source,
    })
}
