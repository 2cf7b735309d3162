//! Full-text fetch of the top ranked results.

use indexmap::IndexMap;
use tracing::info;

use crate::traits::fetcher::ContentFetcher;
use crate::types::source::{FetchedContent, SearchResult};

/// Fetch the first `max_pages` ranked results, keyed by URL.
///
/// URLs the fetcher did not report on are simply absent; callers fall back
/// to the search snippet for those.
pub async fn fetch_top<F>(
    fetcher: &F,
    ranked: &[SearchResult],
    max_pages: usize,
    workers: usize,
) -> IndexMap<String, FetchedContent>
where
    F: ContentFetcher + ?Sized,
{
    let urls: Vec<String> = ranked.iter().take(max_pages).map(|r| r.url.clone()).collect();
    if urls.is_empty() {
        return IndexMap::new();
    }

    let fetched: IndexMap<String, FetchedContent> = fetcher
        .fetch(&urls, workers.max(1))
        .await
        .into_iter()
        .map(|content| (content.url.clone(), content))
        .collect();

    let succeeded = fetched.values().filter(|c| c.success).count();
    info!(succeeded, attempted = urls.len(), "Content fetch complete");
    fetched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_fetches_only_top_pages() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.com", "A", "alpha")
            .with_page("https://b.com", "B", "beta");
        let ranked = vec![
            SearchResult::new("https://a.com"),
            SearchResult::new("https://b.com"),
            SearchResult::new("https://c.com"),
        ];

        let fetched = fetch_top(&fetcher, &ranked, 2, 4).await;
        assert_eq!(fetched.len(), 2);
        assert!(fetched["https://a.com"].success);
        assert_eq!(fetcher.requested(), vec!["https://a.com", "https://b.com"]);
    }

    #[tokio::test]
    async fn test_unknown_pages_are_failures() {
        let fetcher = MockFetcher::new();
        let ranked = vec![SearchResult::new("https://a.com")];

        let fetched = fetch_top(&fetcher, &ranked, 10, 4).await;
        assert!(!fetched["https://a.com"].success);
        assert_eq!(fetched["https://a.com"].usable_content(), None);
    }

    #[tokio::test]
    async fn test_nothing_to_fetch() {
        let fetcher = MockFetcher::new();
        assert!(fetch_top(&fetcher, &[], 10, 4).await.is_empty());
        assert!(fetcher.requested().is_empty());
    }
}
