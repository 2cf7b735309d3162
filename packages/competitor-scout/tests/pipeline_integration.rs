//! End-to-end tests for the discovery pipeline against mock collaborators.

use std::sync::Arc;

use competitor_scout::pipeline::{generate_queries, merge, validate};
use competitor_scout::{
    AnalysisRequest, Competitor, CompetitorCandidate, CompetitorScout, MockFetcher, MockLlm,
    MockWebSearcher, PipelineConfig, ProgressEvent, ScoutError, SearchResult,
};
use tokio::sync::mpsc;

const TOP10_URL: &str = "https://example.com/top10";
const NOTION_URL: &str = "https://example.com/notion-review";

const QUERY_REPLY: &str =
    r#"{"queries": [{"type": "domain", "name": "排名", "query": "笔记软件 排名"}]}"#;

const EXTRACT_REPLY: &str = r#"```json
{"competitors": [
  {"name": "Notion", "features": ["双向链接编辑"], "score": 9, "reason": "直接竞品"},
  {"name": "notion", "features": ["数据库视图"], "score": 7, "reason": "重复"},
  {"name": "Obsidian", "features": ["本地知识库"], "score": "8", "reason": "本地笔记"},
  {"name": "首页", "features": [], "score": 10, "reason": "导航"}
]}
```"#;

const FEATURE_REPLY: &str = r#"{"features": ["多人实时协作", "短"]}"#;

const INSIGHTS_REPLY: &str = r#"{
  "summary": "市场集中在少数头部产品",
  "market_stage": "成熟期",
  "must_have_features": ["双向链接编辑"],
  "differentiators": ["本地知识库"],
  "recommendations": [{"title": "聚焦细分", "detail": "面向学生群体"}, "强化离线能力"],
  "risks": ["头部产品迁移成本低"]
}"#;

fn scripted_llm() -> MockLlm {
    MockLlm::new()
        .with_reply_containing("搜索查询优化专家", QUERY_REPLY)
        .with_reply_containing("竞品分析师", EXTRACT_REPLY)
        .with_reply_containing("产品分析专家", FEATURE_REPLY)
        .with_reply_containing("产品战略顾问", INSIGHTS_REPLY)
}

fn scripted_searcher() -> MockWebSearcher {
    MockWebSearcher::new()
        .with_results(
            "笔记软件 排名",
            vec![SearchResult::new(TOP10_URL)
                .with_title("2024 十大笔记软件")
                .with_snippet("Notion、Obsidian 排名")],
        )
        .with_results(
            "Notion 笔记软件 功能介绍 核心能力",
            vec![SearchResult::new(NOTION_URL).with_title("Notion 评测")],
        )
}

fn scripted_fetcher() -> MockFetcher {
    MockFetcher::new()
        .with_page(TOP10_URL, "十大笔记软件", "1. Notion 2. Obsidian")
        .with_page(NOTION_URL, "Notion 评测", "Notion 支持多人实时协作")
}

fn note_request() -> AnalysisRequest {
    AnalysisRequest::new("MyNote").with_domain("笔记软件")
}

fn feature_names(competitor: &Competitor) -> Vec<&str> {
    competitor.features.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_full_run() {
    let scout = CompetitorScout::new(scripted_searcher(), scripted_fetcher(), scripted_llm());

    let result = scout.run(&note_request()).await.unwrap();

    assert_eq!(result.queries, vec!["笔记软件 排名".to_string()]);
    assert_eq!(result.total_count, 2);

    let names: Vec<&str> = result.competitors.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Notion", "Obsidian"]);

    let notion = &result.competitors[0];
    assert_eq!(notion.score, 9);
    assert_eq!(notion.reason, "直接竞品");
    assert_eq!(
        feature_names(notion),
        vec!["双向链接编辑", "数据库视图", "多人实时协作"]
    );

    // No enrichment results for Obsidian; extracted features survive.
    assert_eq!(feature_names(&result.competitors[1]), vec!["本地知识库"]);

    assert_eq!(result.source_links.len(), 1);
    assert_eq!(result.source_links[0].url, TOP10_URL);

    assert_eq!(result.insights.market_stage, "成熟期");
    assert_eq!(result.insights.recommendations.len(), 2);
    assert_eq!(result.insights.recommendations[0].title, "聚焦细分");

    assert_eq!(result.message(), "成功分析 笔记软件，发现 2 个竞品");
}

#[tokio::test]
async fn test_run_uses_configured_model() {
    let llm = Arc::new(scripted_llm());
    let config = PipelineConfig::default()
        .with_model("deepseek-chat")
        .with_enrichment(false)
        .with_summary(false);
    let scout =
        CompetitorScout::with_config(scripted_searcher(), scripted_fetcher(), llm.clone(), config);

    let result = scout.run(&note_request()).await.unwrap();

    assert_eq!(result.total_count, 2);
    assert!(result.insights.summary.is_empty());

    let calls = llm.calls();
    // One query call plus one extraction per source.
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.model == "deepseek-chat"));
}

#[tokio::test]
async fn test_run_rejects_request_without_domain_or_features() {
    let scout = CompetitorScout::new(MockWebSearcher::new(), MockFetcher::new(), MockLlm::new());

    let request = AnalysisRequest::new("MyNote").with_domain("  ");
    let err = scout.run(&request).await.unwrap_err();

    assert!(matches!(err, ScoutError::InvalidInput { .. }));
    assert!(err.is_user_error());
}

#[tokio::test]
async fn test_run_survives_total_search_outage() {
    let llm = scripted_llm();
    let scout = CompetitorScout::new(
        MockWebSearcher::new().always_failing(),
        MockFetcher::new(),
        llm,
    );

    let result = scout.run(&note_request()).await.unwrap();

    assert_eq!(result.total_count, 0);
    assert!(result.competitors.is_empty());
    assert!(result.source_links.is_empty());
    assert_eq!(result.insights.summary, "未发现竞品，无法生成市场分析");
}

#[tokio::test]
async fn test_run_falls_back_to_snippets_when_fetch_fails() {
    // Fetcher serves nothing, so the ranked snippet becomes the only source.
    let llm = Arc::new(
        MockLlm::new()
            .with_reply_containing("搜索查询优化专家", QUERY_REPLY)
            .with_reply_containing("竞品分析师", EXTRACT_REPLY),
    );
    let config = PipelineConfig::default()
        .with_enrichment(false)
        .with_summary(false);
    let scout =
        CompetitorScout::with_config(scripted_searcher(), MockFetcher::new(), llm.clone(), config);

    let result = scout.run(&note_request()).await.unwrap();

    assert_eq!(result.total_count, 2);
    let extraction = &llm.calls()[1];
    assert!(extraction
        .messages
        .iter()
        .any(|m| m.content.contains("Notion、Obsidian 排名")));
}

#[tokio::test]
async fn test_progress_events_follow_stage_order() {
    let scout = CompetitorScout::new(scripted_searcher(), scripted_fetcher(), scripted_llm());
    let (tx, mut rx) = mpsc::channel(32);

    let result = scout.run_with_progress(&note_request(), tx).await.unwrap();

    let mut stages = Vec::new();
    while let Some(event) = rx.recv().await {
        if let ProgressEvent::CompetitorsValidated { competitors } = &event {
            assert_eq!(competitors.len(), result.total_count);
        }
        stages.push(event.stage());
    }

    assert_eq!(
        stages,
        vec![
            "queries_generated",
            "search_completed",
            "content_fetched",
            "sources_selected",
            "competitors_extracted",
            "competitors_merged",
            "competitors_validated",
            "features_enriched",
            "insights_generated",
        ]
    );
}

#[tokio::test]
async fn test_progress_receiver_dropped_does_not_stop_run() {
    let scout = CompetitorScout::new(scripted_searcher(), scripted_fetcher(), scripted_llm());
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = scout.run_with_progress(&note_request(), tx).await.unwrap();
    assert_eq!(result.total_count, 2);
}

#[tokio::test]
async fn test_generate_queries_without_hints_is_empty() {
    let llm = MockLlm::new().with_default_reply(QUERY_REPLY);

    let queries = generate_queries(None, None, "MyNote", &llm, &PipelineConfig::default()).await;

    assert!(queries.is_empty());
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn test_generate_queries_falls_back_on_model_failure() {
    let llm = MockLlm::new().failing();

    let queries =
        generate_queries(Some("X"), None, "", &llm, &PipelineConfig::default()).await;

    assert_eq!(queries.len(), 1);
    assert!(queries[0].query.contains('X'));
}

#[test]
fn test_merge_is_case_insensitive() {
    let merged = merge(vec![
        CompetitorCandidate::new("Acme").with_score(6),
        CompetitorCandidate::new("acme").with_score(8),
    ]);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, "Acme");
    assert_eq!(merged[0].score, 8);
}

#[test]
fn test_validate_keeps_best_when_nothing_passes() {
    let competitors = vec![
        Competitor::new("A").with_score(2),
        Competitor::new("B").with_score(4),
        Competitor::new("C").with_score(3),
    ];

    let kept = validate(competitors, 6);

    assert!(!kept.is_empty());
    let scores: Vec<u8> = kept.iter().map(|c| c.score).collect();
    assert_eq!(scores, vec![4, 3, 2]);
}
