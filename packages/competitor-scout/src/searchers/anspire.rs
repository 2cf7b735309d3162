//! Anspire web search.
//!
//! GET `https://plugin.anspire.cn/api/ntsearch/search` with bearer auth.
//! Results are `{title, url, content}`; `content` becomes the snippet.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ScoutError};
use crate::security::SecretString;
use crate::traits::searcher::WebSearcher;
use crate::types::source::SearchResult;

/// Default search endpoint.
pub const DEFAULT_ANSPIRE_URL: &str = "https://plugin.anspire.cn/api/ntsearch/search";

/// Anspire search response.
#[derive(Debug, Deserialize)]
struct AnspireResponse {
    #[serde(default)]
    results: Vec<AnspireResult>,
}

/// A single Anspire result.
#[derive(Debug, Deserialize)]
struct AnspireResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl AnspireResult {
    /// Drop results without a parseable URL.
    fn into_search_result(self) -> Option<SearchResult> {
        let url = self.url?;
        let url = url.trim();
        Url::parse(url).ok()?;
        Some(
            SearchResult::new(url)
                .with_title(self.title.unwrap_or_default().trim())
                .with_snippet(self.content.unwrap_or_default().trim()),
        )
    }
}

/// Searcher backed by the Anspire API.
///
/// # Example
///
/// ```rust,ignore
/// let searcher = AnspireSearcher::new(api_key).with_timeout(Duration::from_secs(20));
/// let results = searcher.search("笔记软件 排名", 10).await?;
/// ```
pub struct AnspireSearcher {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
}

impl AnspireSearcher {
    /// Create a searcher against the default endpoint with a 30s timeout.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_ANSPIRE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn map_error(&self, e: reqwest::Error) -> ScoutError {
        if e.is_timeout() {
            ScoutError::Timeout(self.timeout)
        } else {
            ScoutError::Search(Box::new(e))
        }
    }
}

#[async_trait]
impl WebSearcher for AnspireSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let top_k = max_results.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .header("Authorization", self.api_key.bearer())
            .header("Accept", "*/*")
            .query(&[
                ("query", query),
                ("top_k", top_k.as_str()),
                ("Insite", ""),
                ("FromTime", ""),
                ("ToTime", ""),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(query, status = %status, "Anspire search rejected");
            return Err(ScoutError::Search(
                format!("Anspire API error: HTTP {}", status).into(),
            ));
        }

        let body: AnspireResponse = response.json().await.map_err(|e| self.map_error(e))?;

        let mut results: Vec<SearchResult> = body
            .results
            .into_iter()
            .filter_map(AnspireResult::into_search_result)
            .collect();
        results.truncate(max_results);

        debug!(query, results = results.len(), "Anspire search succeeded");
        Ok(results)
    }
}
