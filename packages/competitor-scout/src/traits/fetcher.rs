//! Content fetcher trait.
//!
//! Fetches the full text of a batch of pages. Unlike search, a batch fetch
//! never fails as a whole: each URL gets its own `FetchedContent`, with
//! `success = false` and an error description when that page could not be
//! read.

use async_trait::async_trait;

use crate::types::source::FetchedContent;

/// Bulk page fetcher.
///
/// # Implementations
///
/// - `JinaReader` - Jina Reader (markdown rendering of arbitrary pages)
/// - `MockFetcher` - For testing
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch every URL with at most `max_workers` requests in flight.
    ///
    /// Returns one entry per input URL.
    async fn fetch(&self, urls: &[String], max_workers: usize) -> Vec<FetchedContent>;
}

#[async_trait]
impl<T: ContentFetcher + ?Sized> ContentFetcher for std::sync::Arc<T> {
    async fn fetch(&self, urls: &[String], max_workers: usize) -> Vec<FetchedContent> {
        (**self).fetch(urls, max_workers).await
    }
}
