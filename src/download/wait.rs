//! Pacing between successive dispatches.
//!
//! The dispatch loop calls [`WaitStrategy::wait`] before every URL except the
//! first one. Pacing is measured between dispatches, not completions.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// How long the dispatch loop pauses between two dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Dispatch back to back.
    #[default]
    None,
    /// Sleep exactly this many seconds.
    Fixed {
        /// Delay in whole seconds.
        secs: u64,
    },
    /// Sleep a uniformly random whole number of seconds in `0..=max_secs`.
    Random {
        /// Inclusive upper bound in seconds.
        max_secs: u64,
    },
}

impl WaitStrategy {
    /// Builds the strategy from the `-wait` amount and the `-random-wait` flag.
    ///
    /// Random mode is only selected for a positive amount; a zero amount is a no-op
    /// whatever the flag says.
    #[must_use]
    pub fn from_settings(wait_secs: u64, randomize: bool) -> Self {
        match (wait_secs, randomize) {
            (0, _) => Self::None,
            (secs, false) => Self::Fixed { secs },
            (max_secs, true) => Self::Random { max_secs },
        }
    }

    /// Picks the delay for the next dispatch.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed { secs } => Duration::from_secs(secs),
            Self::Random { max_secs } => {
                let secs = rand::thread_rng().gen_range(0..=max_secs);
                Duration::from_secs(secs)
            }
        }
    }

    /// Suspends the caller for [`next_delay`](Self::next_delay).
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        debug!(delay_secs = delay.as_secs(), "pacing before next dispatch");
        tokio::time::sleep(delay).await;
    }
}
