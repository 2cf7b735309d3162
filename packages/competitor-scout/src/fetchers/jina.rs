//! Jina Reader page fetcher.
//!
//! `GET https://r.jina.ai/<url>` returns the page rendered as markdown, with
//! navigation and ads stripped. No API key is needed.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{Result, ScoutError};
use crate::traits::fetcher::ContentFetcher;
use crate::types::source::FetchedContent;

/// Default reader endpoint.
pub const DEFAULT_JINA_READER_URL: &str = "https://r.jina.ai/";

/// Fetcher that reads pages through Jina Reader.
///
/// # Example
///
/// ```rust,ignore
/// let reader = JinaReader::new();
/// let pages = reader.fetch(&["https://example.com".to_string()], 8).await;
/// ```
pub struct JinaReader {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for JinaReader {
    fn default() -> Self {
        Self::new()
    }
}

impl JinaReader {
    /// Create a reader against the public endpoint with a 30s timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_JINA_READER_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a different reader endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-page timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn reader_url(&self, url: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), url)
    }

    /// Fetch a single page.
    pub async fn fetch_one(&self, url: &str) -> Result<FetchedContent> {
        debug!(url, "Jina fetch starting");
        let fetch_error = |reason: String| ScoutError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.reader_url(url))
            .header("Accept", "text/markdown")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| fetch_error(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let content = response
            .text()
            .await
            .map_err(|e| fetch_error(describe(&e)))?;

        debug!(url, chars = content.chars().count(), "Jina fetch succeeded");
        Ok(FetchedContent::succeeded(url, extract_title(&content), content))
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timeout".to_string()
    } else {
        format!("network error: {}", e)
    }
}

/// Title of a markdown page: the first `# ` heading, else the first
/// non-empty line that is not a bare link, whichever comes first.
pub fn extract_title(markdown: &str) -> String {
    for line in markdown.lines().map(str::trim) {
        if let Some(heading) = line.strip_prefix("# ") {
            return heading.trim().to_string();
        }
        if !line.is_empty() && !line.starts_with("http") {
            return line.to_string();
        }
    }
    String::new()
}

#[async_trait]
impl ContentFetcher for JinaReader {
    async fn fetch(&self, urls: &[String], max_workers: usize) -> Vec<FetchedContent> {
        if urls.is_empty() {
            return Vec::new();
        }

        let pages: Vec<FetchedContent> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                match self.fetch_one(&url).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(url = %url, error = %e, "Page fetch failed");
                        let reason = match e {
                            ScoutError::Fetch { reason, .. } => reason,
                            other => other.to_string(),
                        };
                        FetchedContent::failed(&url, reason)
                    }
                }
            })
            .buffered(max_workers.max(1))
            .collect()
            .await;

        let succeeded = pages.iter().filter(|p| p.success).count();
        info!(succeeded, total = urls.len(), "Jina fetch batch complete");
        pages
    }
}
