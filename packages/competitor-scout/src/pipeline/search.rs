//! Parallel search fan-out, URL dedup and pre-fetch ranking.

use std::cmp::Reverse;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use tracing::{debug, info};

use super::attempt::{attempt, Stage, UnitOfWork};
use crate::traits::searcher::WebSearcher;
use crate::types::query::SearchQuery;
use crate::types::source::SearchResult;

/// In-flight search calls when no explicit bound is given.
pub const DEFAULT_SEARCH_WORKERS: usize = 5;

/// Keywords marking ranking/list pages (+10).
const RANKING_KEYWORDS: [&str; 3] = ["排名", "top", "十大"];

/// Keywords marking roundup pages (+5).
const ROUNDUP_KEYWORDS: [&str; 2] = ["有哪些", "盘点"];

/// Run every query against the searcher, at most 5 at a time.
///
/// A failing query contributes no results. Output is the flattened union in
/// query order, not yet deduplicated.
pub async fn search_all<S>(
    searcher: &S,
    queries: &[SearchQuery],
    max_results_per_query: usize,
) -> Vec<SearchResult>
where
    S: WebSearcher + ?Sized,
{
    search_all_bounded(searcher, queries, max_results_per_query, DEFAULT_SEARCH_WORKERS).await
}

/// [`search_all`] with an explicit concurrency bound.
pub async fn search_all_bounded<S>(
    searcher: &S,
    queries: &[SearchQuery],
    max_results_per_query: usize,
    workers: usize,
) -> Vec<SearchResult>
where
    S: WebSearcher + ?Sized,
{
    let batches: Vec<Vec<SearchResult>> = stream::iter(queries.iter().cloned())
        .map(|query: SearchQuery| async move {
            let results = attempt(
                UnitOfWork::new(Stage::Search, &query.query),
                searcher.search(&query.query, max_results_per_query),
                Vec::new(),
            )
            .await;
            debug!(query = %query.query, results = results.len(), "Search finished");
            results
        })
        .buffered(workers.max(1))
        .collect()
        .await;

    let results: Vec<SearchResult> = batches.into_iter().flatten().collect();
    info!(queries = queries.len(), results = results.len(), "Search fan-out complete");
    results
}

/// Deduplicate by URL. The last record for a URL wins; its position is where
/// the URL was first seen.
pub fn dedupe_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut by_url: IndexMap<String, SearchResult> = IndexMap::with_capacity(results.len());
    for result in results {
        by_url.insert(result.url.clone(), result);
    }
    by_url.into_values().collect()
}

/// Heuristic relevance of a result for competitor discovery.
pub fn ranking_score(result: &SearchResult) -> u32 {
    let text = result.searchable_text().to_lowercase();
    let mut score = 0;
    if RANKING_KEYWORDS.iter().any(|k| text.contains(k)) {
        score += 10;
    }
    if ROUNDUP_KEYWORDS.iter().any(|k| text.contains(k)) {
        score += 5;
    }
    score
}

/// Order results so ranking and roundup pages come first.
///
/// Stable: ties keep their input order. Never drops a result.
pub fn rank_results(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by_cached_key(|r| Reverse(ranking_score(r)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWebSearcher;

    fn result(url: &str, title: &str) -> SearchResult {
        SearchResult::new(url).with_title(title)
    }

    #[tokio::test]
    async fn test_failing_query_contributes_nothing() {
        let searcher = MockWebSearcher::new()
            .with_results("a", vec![result("https://a.com", "A")])
            .with_failure("b")
            .with_results("c", vec![result("https://c.com", "C")]);
        let queries = [SearchQuery::new("a"), SearchQuery::new("b"), SearchQuery::new("c")];

        let results = search_all(&searcher, &queries, 10).await;
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://c.com"]);
        assert_eq!(searcher.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_always_failing_searcher_yields_empty() {
        let searcher = MockWebSearcher::new().always_failing();
        let queries = [SearchQuery::new("a"), SearchQuery::new("b")];
        assert!(search_all(&searcher, &queries, 10).await.is_empty());
    }

    #[test]
    fn test_dedupe_last_write_wins_first_position() {
        let deduped = dedupe_by_url(vec![
            result("https://a.com", "first"),
            result("https://b.com", "B"),
            result("https://a.com", "second"),
        ]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].url, "https://a.com");
        assert_eq!(deduped[0].title, "second");
        assert_eq!(deduped[1].url, "https://b.com");
    }

    #[test]
    fn test_ranking_score() {
        assert_eq!(ranking_score(&result("u", "2024 笔记软件排名")), 10);
        assert_eq!(ranking_score(&result("u", "TOP 10 note apps")), 10);
        assert_eq!(ranking_score(&result("u", "笔记软件有哪些")), 5);
        assert_eq!(ranking_score(&result("u", "十大笔记软件盘点")), 15);
        assert_eq!(ranking_score(&result("u", "Notion 官网")), 0);
    }

    #[test]
    fn test_rank_is_stable_and_keeps_everything() {
        let ranked = rank_results(vec![
            result("https://1.com", "Notion 官网"),
            result("https://2.com", "笔记软件有哪些"),
            result("https://3.com", "Obsidian"),
            result("https://4.com", "十大笔记软件"),
        ]);

        let urls: Vec<_> = ranked.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://4.com", "https://2.com", "https://1.com", "https://3.com"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_is_bounded() {
        let searcher = MockWebSearcher::new().with_latency(std::time::Duration::from_millis(50));
        let queries: Vec<SearchQuery> = (0..12).map(|i| SearchQuery::new(format!("q{}", i))).collect();

        search_all(&searcher, &queries, 10).await;

        assert_eq!(searcher.queries().len(), 12);
        assert_eq!(searcher.peak_in_flight(), DEFAULT_SEARCH_WORKERS);
    }
}
