//! Feature enrichment: a second, per-competitor search and extraction pass.

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::attempt::{attempt, complete, Stage, UnitOfWork};
use super::extract::{coerce_string_list, truncate_chars};
use super::json_repair::parse_lenient;
use super::prompts::{format_feature_prompt, format_feature_system_prompt};
use crate::error::Result;
use crate::traits::fetcher::ContentFetcher;
use crate::traits::llm::{CompletionModel, Message};
use crate::traits::searcher::WebSearcher;
use crate::types::competitor::Competitor;
use crate::types::config::PipelineConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeatureReply {
    features: Value,
}

/// Search query used to find one competitor's features.
pub fn feature_query(name: &str, domain: Option<&str>) -> String {
    match domain.map(str::trim).filter(|d| !d.is_empty()) {
        Some(domain) => format!("{} {} 功能介绍 核心能力", name, domain),
        None => format!("{} 产品功能 特点 核心能力", name),
    }
}

/// Collaborators used by the enrichment pass.
pub struct Enricher<'a, S: ?Sized, F: ?Sized, L: ?Sized> {
    pub searcher: &'a S,
    pub fetcher: &'a F,
    pub llm: &'a L,
    pub config: &'a PipelineConfig,
}

impl<'a, S, F, L> Enricher<'a, S, F, L>
where
    S: WebSearcher + ?Sized,
    F: ContentFetcher + ?Sized,
    L: CompletionModel + ?Sized,
{
    pub fn new(searcher: &'a S, fetcher: &'a F, llm: &'a L, config: &'a PipelineConfig) -> Self {
        Self {
            searcher,
            fetcher,
            llm,
            config,
        }
    }

    /// Enrich every competitor, at most `config.enrichment_workers` at a time.
    ///
    /// Every input competitor is in the output, in input order. A competitor
    /// whose enrichment fails is returned unchanged; existing features are
    /// never removed.
    pub async fn enrich(&self, competitors: Vec<Competitor>, domain: Option<&str>) -> Vec<Competitor> {
        let total = competitors.len();
        info!(competitors = total, "Enriching competitor features");

        let enriched: Vec<Competitor> = stream::iter(competitors)
            .map(|competitor| self.enrich_one(competitor, domain))
            .buffered(self.config.enrichment_workers.max(1))
            .collect()
            .await;

        info!(competitors = total, "Feature enrichment complete");
        enriched
    }

    async fn enrich_one(&self, mut competitor: Competitor, domain: Option<&str>) -> Competitor {
        let discovered = attempt(
            UnitOfWork::new(Stage::Enrichment, &competitor.name),
            self.discover_features(&competitor.name, domain),
            Vec::new(),
        )
        .await;

        let before = competitor.features.len();
        let added = competitor.add_features(discovered);
        debug!(
            competitor = %competitor.name,
            before,
            after = before + added,
            "Enriched features"
        );
        competitor
    }

    /// Search, read the top pages, and extract features. Falls back to the
    /// concatenated snippets when no page yields anything.
    async fn discover_features(&self, name: &str, domain: Option<&str>) -> Result<Vec<String>> {
        let query = feature_query(name, domain);
        let results = self
            .searcher
            .search(&query, self.config.enrichment_results)
            .await?;
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let urls: Vec<String> = results
            .iter()
            .take(self.config.enrichment_pages)
            .map(|r| r.url.clone())
            .collect();
        let pages = self.fetcher.fetch(&urls, urls.len().max(1)).await;

        let mut features = Vec::new();
        for page in &pages {
            let Some(content) = page.usable_content() else {
                continue;
            };
            match self.extract_features(name, content).await {
                Ok(found) => features.extend(found),
                Err(e) => warn!(competitor = name, url = %page.url, error = %e, "Feature extraction failed"),
            }
        }

        if features.is_empty() {
            let snippets = results
                .iter()
                .map(|r| r.snippet.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !snippets.is_empty() {
                features = self.extract_features(name, &snippets).await?;
            }
        }

        Ok(features)
    }

    /// Ask the model for one competitor's features in `content`.
    pub async fn extract_features(&self, name: &str, content: &str) -> Result<Vec<String>> {
        let content = truncate_chars(content, self.config.enrichment_char_budget);
        let messages = [
            Message::system(format_feature_system_prompt(name)),
            Message::user(format_feature_prompt(name, content)),
        ];

        let reply = complete(self.llm, &messages, self.config).await?;
        let parsed: FeatureReply = parse_lenient(&reply)?;

        let min_chars = self.config.min_feature_chars;
        Ok(coerce_string_list(&parsed.features)
            .into_iter()
            .filter(|f| f.chars().count() >= min_chars)
            .collect())
    }
}

/// Enrich competitors with the given collaborators.
pub async fn enrich<S, F, L>(
    competitors: Vec<Competitor>,
    domain_hint: Option<&str>,
    searcher: &S,
    fetcher: &F,
    llm: &L,
    config: &PipelineConfig,
) -> Vec<Competitor>
where
    S: WebSearcher + ?Sized,
    F: ContentFetcher + ?Sized,
    L: CompletionModel + ?Sized,
{
    Enricher::new(searcher, fetcher, llm, config)
        .enrich(competitors, domain_hint)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockLlm, MockWebSearcher};
    use crate::types::source::SearchResult;

    fn features(competitor: &Competitor) -> Vec<&str> {
        competitor.features.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_feature_query() {
        assert_eq!(feature_query("飞书", Some("办公")), "飞书 办公 功能介绍 核心能力");
        assert_eq!(feature_query("飞书", Some(" ")), "飞书 产品功能 特点 核心能力");
        assert_eq!(feature_query("飞书", None), "飞书 产品功能 特点 核心能力");
    }

    #[tokio::test]
    async fn test_enrich_merges_page_features() {
        let searcher = MockWebSearcher::new().with_results(
            "飞书 办公 功能介绍 核心能力",
            vec![SearchResult::new("https://feishu.cn/docs")],
        );
        let fetcher = MockFetcher::new().with_page("https://feishu.cn/docs", "飞书", "飞书页面内容");
        let llm = MockLlm::new().with_reply_containing(
            "飞书页面内容",
            r#"{"features": ["多维表格管理", "视频会议", "短", "即时消息"]}"#,
        );
        let config = PipelineConfig::default();

        let base = vec![Competitor::new("飞书").with_features(["即时消息"]).with_score(9)];
        let enriched = enrich(base, Some("办公"), &searcher, &fetcher, &llm, &config).await;

        assert_eq!(features(&enriched[0]), vec!["即时消息", "多维表格管理", "视频会议"]);
        assert_eq!(enriched[0].score, 9);
    }

    #[tokio::test]
    async fn test_snippet_fallback_when_pages_fail() {
        let searcher = MockWebSearcher::new().with_results(
            "Notion 产品功能 特点 核心能力",
            vec![SearchResult::new("https://notion.so").with_snippet("Notion 支持数据库视图")],
        );
        let fetcher = MockFetcher::new();
        let llm = MockLlm::new()
            .with_reply_containing("Notion 支持数据库视图", r#"{"features": ["数据库视图"]}"#);
        let config = PipelineConfig::default();

        let enriched =
            enrich(vec![Competitor::new("Notion")], None, &searcher, &fetcher, &llm, &config).await;
        assert_eq!(features(&enriched[0]), vec!["数据库视图"]);
    }

    #[tokio::test]
    async fn test_failure_leaves_competitor_unchanged() {
        let searcher = MockWebSearcher::new()
            .with_results(
                "A公司 产品功能 特点 核心能力",
                vec![SearchResult::new("https://a.com").with_snippet("alpha snippet")],
            )
            .with_results(
                "B公司 产品功能 特点 核心能力",
                vec![SearchResult::new("https://b.com").with_snippet("beta snippet")],
            );
        let fetcher = MockFetcher::new();
        let llm = MockLlm::new()
            .with_failure_containing("alpha snippet")
            .with_reply_containing("beta snippet", r#"{"features": ["新增功能项"]}"#);
        let config = PipelineConfig::default();

        let base = vec![
            Competitor::new("A公司").with_features(["原有功能"]),
            Competitor::new("B公司").with_features(["原有功能"]),
        ];
        let enriched = enrich(base, None, &searcher, &fetcher, &llm, &config).await;

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].name, "A公司");
        assert_eq!(features(&enriched[0]), vec!["原有功能"]);
        assert_eq!(enriched[1].name, "B公司");
        assert_eq!(features(&enriched[1]), vec!["原有功能", "新增功能项"]);
    }

    #[tokio::test]
    async fn test_search_failure_leaves_competitor_unchanged() {
        let searcher = MockWebSearcher::new().always_failing();
        let fetcher = MockFetcher::new();
        let llm = MockLlm::new();
        let config = PipelineConfig::default();

        let base = vec![Competitor::new("Notion").with_features(["wiki"])];
        let enriched = enrich(base.clone(), None, &searcher, &fetcher, &llm, &config).await;
        assert_eq!(enriched, base);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrichment_is_bounded() {
        let searcher = MockWebSearcher::new().with_latency(std::time::Duration::from_millis(50));
        let fetcher = MockFetcher::new();
        let llm = MockLlm::new();
        let config = PipelineConfig::default();
        let competitors: Vec<Competitor> =
            (0..10).map(|i| Competitor::new(format!("产品{}", i))).collect();

        let enriched = Enricher::new(&searcher, &fetcher, &llm, &config)
            .enrich(competitors, None)
            .await;

        assert_eq!(enriched.len(), 10);
        assert_eq!(searcher.queries().len(), 10);
        assert_eq!(searcher.peak_in_flight(), config.enrichment_workers);
    }
}
