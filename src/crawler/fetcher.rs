//! Resilient fetcher
//!
//! This module wraps the transports with the retry policy:
//! - Identity rotation on every attempt
//! - Randomized, cancellable waits between attempts
//! - One final escalation attempt through the alternate transport
//!
//! | Condition                         | Action                                  |
//! |-----------------------------------|-----------------------------------------|
//! | Success                           | Return immediately                      |
//! | Failure, attempts remain          | Wait `base..=base+jitter`, retry        |
//! | Failure, attempts exhausted       | One alternate attempt if enabled        |
//! | Cancellation (before or waiting)  | Return `Cancelled`, no escalation       |

use crate::config::FetcherConfig;
use crate::crawler::pacer::{DelayRange, Pacer};
use crate::crawler::transport::{FetchError, FetchResult, IdentityPool, Transport};
use std::sync::Arc;
use url::Url;

/// Attempt budget and escalation settings for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: DelayRange,
    pub escalate_to_alt: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.attempts_per_fetch.max(1),
            retry_delay: DelayRange::retry(config),
            escalate_to_alt: config.escalate_to_alt,
        }
    }
}

pub struct ResilientFetcher {
    primary: Arc<dyn Transport>,
    alternate: Option<Arc<dyn Transport>>,
    identities: IdentityPool,
    policy: RetryPolicy,
    pacer: Pacer,
}

impl ResilientFetcher {
    pub fn new(
        primary: Arc<dyn Transport>,
        alternate: Option<Arc<dyn Transport>>,
        identities: IdentityPool,
        policy: RetryPolicy,
        pacer: Pacer,
    ) -> Self {
        Self {
            primary,
            alternate,
            identities,
            policy,
            pacer,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.pacer.is_cancelled()
    }

    /// Fetches a URL, retrying and escalating per the policy
    ///
    /// Makes at most `max_attempts + 1` round trips. The `attempts` count of a
    /// failure covers every round trip made, including the alternate one.
    pub async fn fetch_resilient(&mut self, url: &Url) -> FetchResult {
        let mut attempts = 0u32;
        let mut last_error = FetchError::Cancelled;

        for attempt in 1..=self.policy.max_attempts {
            if self.pacer.is_cancelled() {
                return cancelled(attempts);
            }

            let identity = self.pacer.pick_identity(&self.identities).clone();
            attempts += 1;

            match self.primary.fetch(url, &identity).await {
                FetchResult::Failure { kind, .. } => {
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        self.policy.max_attempts,
                        url,
                        kind
                    );
                    last_error = kind;
                }
                success => return success,
            }

            if attempt < self.policy.max_attempts
                && self.pacer.pause(self.policy.retry_delay).await.is_err()
            {
                return cancelled(attempts);
            }
        }

        if self.policy.escalate_to_alt {
            if let Some(alternate) = &self.alternate {
                if self.pacer.is_cancelled() {
                    return cancelled(attempts);
                }

                tracing::info!("Escalating {} to the alternate transport", url);
                let identity = self.pacer.pick_identity(&self.identities).clone();
                attempts += 1;

                match alternate.fetch(url, &identity).await {
                    FetchResult::Failure { kind, .. } => {
                        tracing::warn!("Alternate attempt failed for {}: {}", url, kind);
                        last_error = kind;
                    }
                    success => return success,
                }
            }
        }

        tracing::debug!("Giving up on {} after {} attempts", url, attempts);
        FetchResult::Failure {
            kind: last_error,
            attempts,
        }
    }
}

fn cancelled(attempts: u32) -> FetchResult {
    FetchResult::Failure {
        kind: FetchError::Cancelled,
        attempts,
    }
}
