//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the discovery library
//! without making real search, fetch or LLM calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{Result, ScoutError};
use crate::traits::{
    fetcher::ContentFetcher,
    llm::{CompletionModel, Message},
    searcher::WebSearcher,
};
use crate::types::source::{FetchedContent, SearchResult};

/// Counts calls in flight and remembers the peak.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hold an in-flight slot for `latency`, if any.
async fn simulate_latency(in_flight: &InFlight, latency: Option<Duration>) {
    let _slot = in_flight.enter();
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

/// A mock completion model.
///
/// Replies are chosen by substring rules checked in insertion order against
/// every message in the conversation; the first matching rule wins. Without
/// a match the default reply is used, and without a default the call fails.
#[derive(Default)]
pub struct MockLlm {
    rules: Arc<RwLock<Vec<MockRule>>>,
    default_reply: Option<String>,
    always_fail: bool,
    calls: Arc<RwLock<Vec<MockLlmCall>>>,
    latency: Option<Duration>,
    in_flight: Arc<InFlight>,
}

#[derive(Debug, Clone)]
enum MockRule {
    Reply { needle: String, reply: String },
    Fail { needle: String },
}

/// Record of a call made to the mock model.
#[derive(Debug, Clone)]
pub struct MockLlmCall {
    pub messages: Vec<Message>,
    pub model: String,
}

impl MockLlm {
    /// Create a mock with no replies configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` when any message contains `needle`.
    pub fn with_reply_containing(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.write().unwrap().push(MockRule::Reply {
            needle: needle.into(),
            reply: reply.into(),
        });
        self
    }

    /// Fail when any message contains `needle`.
    pub fn with_failure_containing(self, needle: impl Into<String>) -> Self {
        self.rules.write().unwrap().push(MockRule::Fail {
            needle: needle.into(),
        });
        self
    }

    /// Reply used when no rule matches.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    /// Fail every call.
    pub fn failing(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Most calls that were ever in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak()
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockLlmCall> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl CompletionModel for MockLlm {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String> {
        self.calls.write().unwrap().push(MockLlmCall {
            messages: messages.to_vec(),
            model: model.to_string(),
        });
        simulate_latency(&self.in_flight, self.latency).await;

        if self.always_fail {
            return Err(ScoutError::Llm("mock model failure".into()));
        }

        let contains = |needle: &str| messages.iter().any(|m| m.content.contains(needle));
        let rules = self.rules.read().unwrap();
        for rule in rules.iter() {
            match rule {
                MockRule::Reply { needle, reply } if contains(needle) => return Ok(reply.clone()),
                MockRule::Fail { needle } if contains(needle) => {
                    return Err(ScoutError::Llm(
                        format!("mock failure for {:?}", needle).into(),
                    ))
                }
                _ => {}
            }
        }

        self.default_reply
            .clone()
            .ok_or_else(|| ScoutError::Llm("no mock reply configured".into()))
    }
}

/// A mock web searcher keyed by exact query string.
///
/// Unknown queries return no results.
#[derive(Default)]
pub struct MockWebSearcher {
    results: Arc<RwLock<HashMap<String, Vec<SearchResult>>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    always_fail: bool,
    queries: Arc<RwLock<Vec<String>>>,
    latency: Option<Duration>,
    in_flight: Arc<InFlight>,
}

impl MockWebSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add results for a query.
    pub fn with_results(self, query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        self.results.write().unwrap().insert(query.into(), results);
        self
    }

    /// Make one query fail.
    pub fn with_failure(self, query: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(query.into());
        self
    }

    /// Make every query fail.
    pub fn always_failing(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// Delay every search by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Most searches that were ever in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak()
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.write().unwrap().push(query.to_string());
        simulate_latency(&self.in_flight, self.latency).await;

        if self.always_fail || self.failures.read().unwrap().contains(query) {
            return Err(ScoutError::Search(
                format!("mock search failure for {:?}", query).into(),
            ));
        }

        let mut results = self
            .results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();
        results.truncate(max_results);
        Ok(results)
    }
}

/// A mock content fetcher keyed by URL.
///
/// Unknown URLs come back as failed fetches.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, (String, String)>>>,
    requested: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a fetcher with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` with `title` for `url`.
    pub fn with_page(
        self,
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), (title.into(), content.into()));
        self
    }

    /// URLs requested, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, urls: &[String], _max_workers: usize) -> Vec<FetchedContent> {
        self.requested.write().unwrap().extend(urls.iter().cloned());

        let pages = self.pages.read().unwrap();
        urls.iter()
            .map(|url| match pages.get(url) {
                Some((title, content)) => FetchedContent::succeeded(url, title, content),
                None => FetchedContent::failed(url, "HTTP 404"),
            })
            .collect()
    }
}
