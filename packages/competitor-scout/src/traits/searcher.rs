//! Web searcher trait.
//!
//! Abstracts over search providers (Anspire, SerpAPI, Tavily, ...). The
//! pipeline fans out one call per query and tolerates individual failures,
//! so implementations should return errors rather than empty results when
//! the provider is unreachable.
//!
//! ```rust,ignore
//! let searcher = AnspireSearcher::new(api_key);
//! let results = searcher.search("Notion 竞品 排名", 10).await?;
//!
//! for result in results {
//!     println!("{} - {}", result.url, result.title);
//! }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::source::SearchResult;

/// Web search for open-world discovery.
///
/// # Implementations
///
/// - `AnspireSearcher` - Anspire search API
/// - `MockWebSearcher` - For testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web, returning at most `max_results` results.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait]
impl<T: WebSearcher + ?Sized> WebSearcher for std::sync::Arc<T> {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        (**self).search(query, max_results).await
    }
}
