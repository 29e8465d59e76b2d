//! Dispatch loop with semaphore-based concurrency control.
//!
//! This module provides the `DownloadEngine`, which reads URL lines serially,
//! paces dispatches with a [`WaitStrategy`], and runs each URL through a
//! [`Transfer`] in its own Tokio task while never exceeding the configured
//! number of in-flight transfers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use batchget::download::{DownloadEngine, Downloader, HttpClient, WaitStrategy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Arc::new(Downloader::new(HttpClient::new()?, "."));
//! let engine = DownloadEngine::new(4, WaitStrategy::Fixed { secs: 1 });
//! let input: &[u8] = b"https://example.com/a.pdf\nhttps://example.com/b.pdf\n";
//! let stats = engine.run(input, downloader).await;
//! println!("completed: {}, failed: {}", stats.completed(), stats.failed());
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use super::wait::WaitStrategy;
use super::worker::Transfer;
use crate::output;

/// Minimum concurrency; smaller requests are raised to it.
const MIN_CONCURRENCY: usize = 1;

/// Statistics from one engine run.
///
/// Updated from concurrent tasks through atomic counters.
#[derive(Debug, Default)]
pub struct DownloadStats {
    dispatched: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs handed to a task.
    #[must_use]
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Number of successfully completed downloads.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of failed downloads (including panicked tasks).
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    fn increment_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> Self {
        Self {
            dispatched: AtomicUsize::new(self.dispatched()),
            completed: AtomicUsize::new(self.completed()),
            failed: AtomicUsize::new(self.failed()),
        }
    }
}

/// Dispatch loop and concurrency governor.
///
/// # Concurrency Model
///
/// - Lines are read and dispatched strictly in input order by a single loop
/// - A semaphore permit is acquired right before each spawn; when the cap is
///   saturated the loop waits there, which also stops further reading
/// - The permit moves into the task and is released when it ends, whatever the outcome
/// - Finished tasks are reaped between dispatches; after end of input every
///   remaining task is awaited
#[derive(Debug)]
pub struct DownloadEngine {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    wait: WaitStrategy,
    report_success: bool,
}

impl DownloadEngine {
    /// Creates an engine allowing `concurrency` simultaneous transfers.
    ///
    /// A concurrency of 0 is treated as 1.
    #[must_use]
    #[instrument(level = "debug")]
    pub fn new(concurrency: usize, wait: WaitStrategy) -> Self {
        let concurrency = concurrency.max(MIN_CONCURRENCY);
        debug!(concurrency, ?wait, "creating download engine");
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            wait,
            report_success: true,
        }
    }

    /// Enables or disables the per-download confirmation on stderr.
    #[must_use]
    pub fn with_success_reports(mut self, enabled: bool) -> Self {
        self.report_success = enabled;
        self
    }

    /// Returns the effective concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Reads `input` to the end, downloading every non-blank line.
    ///
    /// Returns once all dispatched transfers have finished. Individual failures
    /// are logged and counted, never returned; an I/O error ends the input early.
    /// Lines that are not valid UTF-8 are decoded lossily and dispatched like
    /// any other line.
    #[instrument(skip_all, fields(concurrency = self.concurrency))]
    pub async fn run<R>(&self, mut input: R, transfer: Arc<dyn Transfer>) -> DownloadStats
    where
        R: AsyncBufRead + Unpin,
    {
        let stats = Arc::new(DownloadStats::new());
        let mut tasks = JoinSet::new();
        let mut buf = Vec::new();

        info!("starting dispatch");

        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "error reading URL list, no further URLs will be dispatched");
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                warn!(line = %line.trim(), "URL line is not valid UTF-8, invalid bytes replaced");
            }

            let url = line.trim();
            if url.is_empty() {
                continue;
            }

            if stats.dispatched() > 0 {
                self.wait.wait().await;
            }

            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                error!("concurrency semaphore closed, no further URLs will be dispatched");
                break;
            };

            // Finished tasks are reaped as we go so the set stays near the cap.
            while let Some(result) = tasks.try_join_next() {
                record_join(result, &stats);
            }

            stats.increment_dispatched();
            debug!(url = %url, "dispatching");

            let url = url.to_string();
            let transfer = Arc::clone(&transfer);
            let stats = Arc::clone(&stats);
            let report_success = self.report_success;

            tasks.spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let _permit = permit;

                match transfer.transfer(&url).await {
                    Ok(path) => {
                        if report_success {
                            output::report_saved(&url, &path);
                        }
                        stats.increment_completed();
                    }
                    Err(e) => {
                        error!(url = %url, error = %e, "download failed");
                        stats.increment_failed();
                    }
                }
            });
        }

        debug!(task_count = tasks.len(), "waiting for downloads to complete");

        while let Some(result) = tasks.join_next().await {
            record_join(result, &stats);
        }

        info!(
            dispatched = stats.dispatched(),
            completed = stats.completed(),
            failed = stats.failed(),
            "all downloads finished"
        );

        stats.snapshot()
    }
}

/// Counts a task that ended without reporting, i.e. one that panicked.
fn record_join(result: Result<(), JoinError>, stats: &DownloadStats) {
    if let Err(e) = result {
        warn!(error = %e, "download task panicked");
        stats.increment_failed();
    }
}
