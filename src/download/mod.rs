//! HTTP download pipeline: dispatch loop, pacing, worker and client.
//!
//! # Features
//!
//! - Serial dispatch of URL lines with a hard cap on in-flight transfers
//! - Fixed or random pacing between dispatches
//! - Streaming downloads (memory-efficient for large files)
//! - Duplicate filename handling (`name-1.ext`, `name-2.ext`, ...)
//! - Structured error types naming the URL or path involved
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use batchget::download::{DownloadEngine, Downloader, HttpClient, WaitStrategy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(HttpClient::new()?, "./downloads").with_overwrite(false);
//! let engine = DownloadEngine::new(2, WaitStrategy::None);
//! let stats = engine
//!     .run(&b"https://example.com/paper.pdf\n"[..], Arc::new(downloader))
//!     .await;
//! println!("Downloaded: {}", stats.completed());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
pub mod filename;
mod wait;
mod worker;

pub use client::{HttpClient, parse_http_url};
pub use engine::{DownloadEngine, DownloadStats};
pub use error::DownloadError;
pub use filename::ClaimedNames;
pub use wait::WaitStrategy;
pub use worker::{Downloader, Transfer};

// Note: no module-local Result alias; signatures spell out `Result<T, DownloadError>`.
