//! The scout - main entry point for a discovery run.
//!
//! Stages run one after another, each fully joined before the next starts:
//! queries → search → rank → fetch → extract → merge → validate → enrich →
//! summarize. Every stage is also exposed on its own so callers can drive
//! the pipeline step by step.

use indexmap::{IndexMap, IndexSet};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::enrich::Enricher;
use super::extract::{extract_all, select_sources};
use super::fetch::fetch_top;
use super::merge::merge;
use super::progress::ProgressEvent;
use super::queries::generate_queries;
use super::search::{dedupe_by_url, rank_results, search_all_bounded};
use super::summarize::summarize;
use super::validate::validate_with_fallback;
use crate::error::{Result, ScoutError};
use crate::traits::{fetcher::ContentFetcher, llm::CompletionModel, searcher::WebSearcher};
use crate::types::{
    analysis::{AnalysisRequest, AnalysisResult, Insights},
    competitor::{Competitor, CompetitorCandidate},
    config::PipelineConfig,
    query::SearchQuery,
    source::{FetchedContent, SearchResult, Source, SourceLink},
};

/// Competitor discovery over a searcher, a page fetcher and a model.
///
/// # Example
///
/// ```rust,ignore
/// let scout = CompetitorScout::new(searcher, fetcher, llm);
///
/// let request = AnalysisRequest::new("Notion").with_domain("笔记软件");
/// let result = scout.run(&request).await?;
///
/// for competitor in &result.competitors {
///     println!("{} ({})", competitor.name, competitor.score);
/// }
/// ```
pub struct CompetitorScout<S, F, L> {
    searcher: S,
    fetcher: F,
    llm: L,
    config: PipelineConfig,
}

impl<S, F, L> CompetitorScout<S, F, L>
where
    S: WebSearcher,
    F: ContentFetcher,
    L: CompletionModel,
{
    /// Create a scout with the default configuration.
    pub fn new(searcher: S, fetcher: F, llm: L) -> Self {
        Self::with_config(searcher, fetcher, llm, PipelineConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(searcher: S, fetcher: F, llm: L, config: PipelineConfig) -> Self {
        Self {
            searcher,
            fetcher,
            llm,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    // =========================================================================
    // Stages
    // =========================================================================

    /// STAGE: Generate search queries for the request.
    pub async fn generate_queries(&self, request: &AnalysisRequest) -> Vec<SearchQuery> {
        generate_queries(
            request.domain_hint(),
            request.feature_hint(),
            &request.product_name,
            &self.llm,
            &self.config,
        )
        .await
    }

    /// STAGE: Search every query, dedupe by URL and rank for fetching.
    pub async fn search(&self, queries: &[SearchQuery]) -> Vec<SearchResult> {
        let results = search_all_bounded(
            &self.searcher,
            queries,
            self.config.max_results_per_query,
            self.config.search_workers,
        )
        .await;
        rank_results(dedupe_by_url(results))
    }

    /// STAGE: Fetch full text for the top ranked results.
    pub async fn fetch(&self, ranked: &[SearchResult]) -> IndexMap<String, FetchedContent> {
        fetch_top(
            &self.fetcher,
            ranked,
            self.config.max_fetch_pages,
            self.config.fetch_workers,
        )
        .await
    }

    /// STAGE: Choose extraction sources.
    pub fn select_sources(
        &self,
        ranked: &[SearchResult],
        fetched: &IndexMap<String, FetchedContent>,
    ) -> Vec<Source> {
        select_sources(ranked, fetched, self.config.max_sources)
    }

    /// STAGE: Extract candidates from every source.
    pub async fn extract(
        &self,
        sources: &[Source],
        request: &AnalysisRequest,
    ) -> Vec<CompetitorCandidate> {
        extract_all(
            sources,
            request.domain_hint(),
            request.feature_hint(),
            &self.llm,
            &self.config,
        )
        .await
    }

    /// STAGE: Merge candidates into unique competitors.
    pub fn merge(&self, candidates: Vec<CompetitorCandidate>) -> Vec<Competitor> {
        merge(candidates)
    }

    /// STAGE: Apply the relevance threshold.
    pub fn validate(&self, competitors: Vec<Competitor>) -> Vec<Competitor> {
        validate_with_fallback(
            competitors,
            self.config.min_score,
            self.config.fallback_top_n,
        )
    }

    /// STAGE: Enrich competitor features with a second search pass.
    pub async fn enrich(
        &self,
        competitors: Vec<Competitor>,
        request: &AnalysisRequest,
    ) -> Vec<Competitor> {
        Enricher::new(&self.searcher, &self.fetcher, &self.llm, &self.config)
            .enrich(competitors, request.domain_hint())
            .await
    }

    /// STAGE: Generate market insights.
    pub async fn summarize(&self, competitors: &[Competitor], request: &AnalysisRequest) -> Insights {
        summarize(
            competitors,
            request.domain_hint(),
            request.feature_hint(),
            &request.product_name,
            &self.llm,
            &self.config,
        )
        .await
    }

    // =========================================================================
    // Full runs
    // =========================================================================

    /// Run the whole pipeline.
    ///
    /// Fails only with [`ScoutError::InvalidInput`] when the request has
    /// neither a domain nor features; upstream failures degrade the result.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        self.run_inner(request, None).await
    }

    /// Run the whole pipeline, sending a [`ProgressEvent`] after each stage.
    ///
    /// A closed receiver does not stop the run.
    pub async fn run_with_progress(
        &self,
        request: &AnalysisRequest,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Result<AnalysisResult> {
        self.run_inner(request, Some(&progress)).await
    }

    async fn run_inner(
        &self,
        request: &AnalysisRequest,
        progress: Option<&mpsc::Sender<ProgressEvent>>,
    ) -> Result<AnalysisResult> {
        if !request.is_searchable() {
            return Err(ScoutError::invalid_input(
                "at least one of domain or features is required",
            ));
        }

        info!(
            product = %request.product_name,
            domain = request.domain_hint(),
            features = request.feature_hint(),
            "Starting competitor analysis"
        );

        let queries = self.generate_queries(request).await;
        emit(progress, || ProgressEvent::QueriesGenerated {
            queries: queries.clone(),
        })
        .await;
        if queries.is_empty() {
            return Ok(AnalysisResult::empty(request));
        }

        let ranked = self.search(&queries).await;
        emit(progress, || ProgressEvent::SearchCompleted {
            results: ranked.len(),
        })
        .await;

        let fetched = self.fetch(&ranked).await;
        emit(progress, || ProgressEvent::ContentFetched {
            attempted: fetched.len(),
            succeeded: fetched.values().filter(|c| c.success).count(),
        })
        .await;

        let sources = self.select_sources(&ranked, &fetched);
        emit(progress, || ProgressEvent::SourcesSelected {
            sources: sources.len(),
        })
        .await;

        let candidates = self.extract(&sources, request).await;
        emit(progress, || ProgressEvent::CompetitorsExtracted {
            candidates: candidates.len(),
        })
        .await;

        let merged = self.merge(candidates);
        emit(progress, || ProgressEvent::CompetitorsMerged {
            competitors: merged.len(),
        })
        .await;

        let mut competitors = self.validate(merged);
        emit(progress, || ProgressEvent::CompetitorsValidated {
            competitors: competitors.clone(),
        })
        .await;

        if self.config.enrich && !competitors.is_empty() {
            competitors = self.enrich(competitors, request).await;
            emit(progress, || ProgressEvent::FeaturesEnriched {
                competitors: competitors.clone(),
            })
            .await;
        }

        let insights = if self.config.summarize {
            let insights = self.summarize(&competitors, request).await;
            emit(progress, || ProgressEvent::InsightsGenerated {
                insights: insights.clone(),
            })
            .await;
            insights
        } else {
            Insights::default()
        };

        let result = AnalysisResult {
            domain: request.domain.clone(),
            features: request.features.clone(),
            product_name: request.product_name.clone(),
            queries: queries.into_iter().map(|q| q.query).collect(),
            total_count: competitors.len(),
            competitors,
            source_links: source_links(&sources),
            insights,
            generated_at: chrono::Utc::now(),
        };

        info!(
            competitors = result.total_count,
            sources = result.source_links.len(),
            "Competitor analysis complete"
        );
        Ok(result)
    }
}

/// Links for the sources used, one per URL.
fn source_links(sources: &[Source]) -> Vec<SourceLink> {
    let mut seen = IndexSet::new();
    sources
        .iter()
        .filter(|s| seen.insert(s.url.as_str()))
        .map(SourceLink::from)
        .collect()
}

async fn emit(progress: Option<&mpsc::Sender<ProgressEvent>>, event: impl FnOnce() -> ProgressEvent) {
    let Some(tx) = progress else {
        return;
    };
    let event = event();
    let stage = event.stage();
    if tx.send(event).await.is_err() {
        debug!(stage, "Progress receiver dropped");
    }
}
