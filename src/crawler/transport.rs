//! HTTP transport
//!
//! This module performs single network round trips on behalf of the fetcher:
//! - Building HTTP clients for the primary and alternate profiles
//! - Applying the per-request browser identity
//! - Classifying failures into HTTP status and network errors
//!
//! A transport never retries and never returns `Err`; every outcome is a
//! `FetchResult`.

use crate::config::{defaults, IdentityConfig};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, DNT, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Why a fetch did not produce a body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connection, timeout, redirect or body-read failure
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a 4xx or 5xx status
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// The run was cancelled before or between attempts
    #[error("cancelled")]
    Cancelled,
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        body: Vec<u8>,
        status: u16,
        /// Final URL after redirects
        final_url: Url,
    },

    /// Every permitted attempt failed
    Failure {
        kind: FetchError,
        /// Round trips made, including any alternate attempt
        attempts: u32,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure of a single round trip
    pub fn failed(kind: FetchError) -> Self {
        Self::Failure { kind, attempts: 1 }
    }
}

/// A browser identity presented on a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
    pub accept_language: String,
}

impl From<&IdentityConfig> for Identity {
    fn from(config: &IdentityConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        }
    }
}

/// Read-only pool of identities rotated across attempts
///
/// Never empty: an empty input falls back to the built-in user agents.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Arc<[Identity]>,
}

impl IdentityPool {
    pub fn new(identities: Vec<Identity>) -> Self {
        let identities = if identities.is_empty() {
            defaults::USER_AGENTS
                .iter()
                .map(|ua| Identity {
                    user_agent: ua.to_string(),
                    accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
                })
                .collect()
        } else {
            identities
        };

        Self {
            identities: identities.into(),
        }
    }

    pub fn from_config(identities: &[IdentityConfig]) -> Self {
        Self::new(identities.iter().map(Identity::from).collect())
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Returns the identity at `index`, wrapping around the pool
    pub fn get(&self, index: usize) -> &Identity {
        &self.identities[index % self.identities.len()]
    }
}

/// One network round trip
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url, identity: &Identity) -> FetchResult;
}

/// Request header profile of an HTTP transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProfile {
    /// Ordinary browser-like navigation headers
    Primary,
    /// Full navigation metadata, a same-site referer and a cookie store
    Alternate,
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    profile: TransportProfile,
}

impl HttpTransport {
    /// Builds a transport for the given profile
    ///
    /// `origin` is the site base URL; the alternate profile sends it as the
    /// referer.
    pub fn new(
        profile: TransportProfile,
        timeout: Duration,
        origin: &Url,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(profile, timeout, origin)?;
        Ok(Self { client, profile })
    }

    pub fn profile(&self) -> TransportProfile {
        self.profile
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url, identity: &Identity) -> FetchResult {
        let mut request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, identity.user_agent.as_str());
        if !identity.accept_language.is_empty() {
            request = request.header(ACCEPT_LANGUAGE, identity.accept_language.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchResult::failed(classify_error(&e)),
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return FetchResult::failed(FetchError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().clone();
        match response.bytes().await {
            Ok(body) => FetchResult::Success {
                body: body.to_vec(),
                status: status.as_u16(),
                final_url,
            },
            Err(e) => FetchResult::failed(classify_error(&e)),
        }
    }
}

/// Builds an HTTP client with the default headers of a profile
pub fn build_http_client(
    profile: TransportProfile,
    timeout: Duration,
    origin: &Url,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(defaults::ACCEPT_LANGUAGE),
    );
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if profile == TransportProfile::Alternate {
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-origin"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-user"),
            HeaderValue::from_static("?1"),
        );

        let referer = format!("{}/", origin.origin().ascii_serialization());
        if let Ok(value) = HeaderValue::from_str(&referer) {
            headers.insert(REFERER, value);
        }

        builder = builder.cookie_store(true);
    }

    builder.default_headers(headers).build()
}

fn classify_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("request timed out".to_string())
    } else if e.is_connect() {
        FetchError::Network(format!("connection failed: {}", e))
    } else if e.is_redirect() {
        FetchError::Network(format!("redirect error: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}
