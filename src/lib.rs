//! Batchget Core Library
//!
//! This library provides the pieces behind the `batchget` tool, which reads
//! URLs from files and arguments and downloads each one to disk with a bounded
//! number of concurrent transfers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`input`] - Aggregates URL sources into a single line stream
//! - [`download`] - Dispatch loop, pacing, worker and HTTP client
//! - [`config`] - Immutable run configuration
//! - [`user_agent`] - Built-in User-Agent strings
//! - [`output`] - User-facing stdout/stderr messages

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod input;
pub mod output;
pub mod user_agent;

// Re-export commonly used types
pub use config::{DEFAULT_CONNECTIONS, RawConfig, RunConfig, SetupError, prepare_destination};
pub use download::{
    ClaimedNames, DownloadEngine, DownloadError, DownloadStats, Downloader, HttpClient, Transfer,
    WaitStrategy,
};
pub use input::{STDIN_SOURCE, SourceError, UrlSources};
