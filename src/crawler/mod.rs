//! Crawler module for category discovery and listing harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP transports with browser identities
//! - Retrying, escalating fetches
//! - Cancellable pacing
//! - Category discovery
//! - Overall crawl coordination

mod coordinator;
mod discovery;
mod fetcher;
mod pacer;
mod transport;

#[cfg(test)]
mod testing;

pub use coordinator::{deliver, run_crawl, Crawler};
pub use discovery::CategoryDiscoverer;
pub use fetcher::{ResilientFetcher, RetryPolicy};
pub use pacer::{Cancelled, DelayRange, Pacer};
pub use transport::{
    build_http_client, FetchError, FetchResult, HttpTransport, Identity, IdentityPool, Transport,
    TransportProfile,
};
