//! In-memory transport for crawler unit tests

use crate::crawler::transport::{FetchError, FetchResult, Identity, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Canned response of the fake transport
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Status(u16),
    Network,
}

impl Reply {
    fn into_result(self, url: &Url) -> FetchResult {
        match self {
            Reply::Body(body) => FetchResult::Success {
                body: body.into_bytes(),
                status: 200,
                final_url: url.clone(),
            },
            Reply::Status(code) => FetchResult::failed(FetchError::HttpStatus(code)),
            Reply::Network => FetchResult::failed(FetchError::Network("connection reset".to_string())),
        }
    }
}

/// Answers from a script first, then from per-URL routes, then with a 404
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Reply>>,
    routes: HashMap<String, Reply>,
    calls: Mutex<Vec<(Url, String)>>,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl FakeTransport {
    pub fn scripted(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn routed(routes: &[(&str, Reply)]) -> Self {
        Self {
            routes: routes
                .iter()
                .map(|(url, reply)| (url.to_string(), reply.clone()))
                .collect(),
            ..Self::default()
        }
    }

    /// Cancels `token` while serving the `n`th call (1-based)
    pub fn cancelling_on(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((n, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.to_string())
            .collect()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, ua)| ua.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, url: &Url, identity: &Identity) -> FetchResult {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((url.clone(), identity.user_agent.clone()));
            calls.len()
        };

        if let Some((n, token)) = &self.cancel_on_call {
            if call == *n {
                token.cancel();
            }
        }

        let scripted = self.script.lock().unwrap().pop_front();
        let reply = scripted
            .or_else(|| self.routes.get(url.as_str()).cloned())
            .unwrap_or(Reply::Status(404));
        reply.into_result(url)
    }
}
