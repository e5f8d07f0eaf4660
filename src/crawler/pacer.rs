//! Cancellable randomized delays
//!
//! Every sleep in the crawl goes through a `Pacer`, so a cancellation request
//! interrupts whatever wait is in progress. The pacer also owns the random
//! number generator used for delay jitter and identity rotation, which makes
//! a seeded run reproducible.

use crate::config::{FetcherConfig, PacingConfig};
use crate::crawler::transport::{Identity, IdentityPool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Inclusive range of delays in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// A range that never sleeps
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    pub fn page(config: &PacingConfig) -> Self {
        Self::new(config.page_delay_min_ms, config.page_delay_max_ms)
    }

    pub fn category(config: &PacingConfig) -> Self {
        Self::new(config.category_delay_min_ms, config.category_delay_max_ms)
    }

    /// `base` to `base + jitter` between fetch attempts
    pub fn retry(config: &FetcherConfig) -> Self {
        Self::new(
            config.retry_delay_ms,
            config.retry_delay_ms.saturating_add(config.retry_jitter_ms),
        )
    }
}

/// The wait was interrupted by a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

pub struct Pacer {
    rng: StdRng,
    cancel: CancellationToken,
}

impl Pacer {
    /// Creates a pacer seeded from `seed`, or from OS entropy when None
    pub fn new(seed: Option<u64>, cancel: CancellationToken) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng, cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Draws a delay uniformly from the range
    pub fn draw(&mut self, range: DelayRange) -> Duration {
        if range.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.random_range(range.min_ms..=range.max_ms))
    }

    /// Sleeps for a random duration from the range
    ///
    /// Returns the time slept, or `Cancelled` as soon as cancellation is
    /// requested (including before the sleep starts).
    pub async fn pause(&mut self, range: DelayRange) -> Result<Duration, Cancelled> {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let delay = self.draw(range);
        if delay.is_zero() {
            return Ok(delay);
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep(delay) => Ok(delay),
        }
    }

    /// Picks a random identity from the pool
    pub fn pick_identity<'p>(&mut self, pool: &'p IdentityPool) -> &'p Identity {
        let index = self.rng.random_range(0..pool.len());
        pool.get(index)
    }
}
