//! Progress events emitted by a streaming run.

use serde::Serialize;

use crate::types::analysis::Insights;
use crate::types::competitor::Competitor;
use crate::types::query::SearchQuery;

/// One stage boundary crossed during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    QueriesGenerated {
        queries: Vec<SearchQuery>,
    },
    SearchCompleted {
        results: usize,
    },
    ContentFetched {
        attempted: usize,
        succeeded: usize,
    },
    SourcesSelected {
        sources: usize,
    },
    CompetitorsExtracted {
        candidates: usize,
    },
    CompetitorsMerged {
        competitors: usize,
    },
    CompetitorsValidated {
        competitors: Vec<Competitor>,
    },
    FeaturesEnriched {
        competitors: Vec<Competitor>,
    },
    InsightsGenerated {
        insights: Insights,
    },
}

impl ProgressEvent {
    /// Stage name, also used as the SSE event name.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::QueriesGenerated { .. } => "queries_generated",
            Self::SearchCompleted { .. } => "search_completed",
            Self::ContentFetched { .. } => "content_fetched",
            Self::SourcesSelected { .. } => "sources_selected",
            Self::CompetitorsExtracted { .. } => "competitors_extracted",
            Self::CompetitorsMerged { .. } => "competitors_merged",
            Self::CompetitorsValidated { .. } => "competitors_validated",
            Self::FeaturesEnriched { .. } => "features_enriched",
            Self::InsightsGenerated { .. } => "insights_generated",
        }
    }
}
