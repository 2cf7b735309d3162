//! Configuration for a pipeline run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the competitor discovery pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model name passed to every completion call.
    pub model: String,

    /// Results requested from the search provider per query.
    ///
    /// Default: 10.
    pub max_results_per_query: usize,

    /// In-flight search calls during fan-out. Default: 5.
    pub search_workers: usize,

    /// Top ranked results whose full text is fetched. Default: 10.
    pub max_fetch_pages: usize,

    /// Parallelism handed to the content fetcher. Default: 8.
    pub fetch_workers: usize,

    /// Upper bound on extraction sources (full text first, then snippets).
    ///
    /// Default: 20.
    pub max_sources: usize,

    /// In-flight extractor calls. Default: 4.
    pub extraction_workers: usize,

    /// Characters of source text sent to one extractor call. Default: 50 000.
    pub source_char_budget: usize,

    /// Minimum relevance score kept by validation. Default: 6.
    pub min_score: u8,

    /// How many competitors validation keeps when nothing reaches `min_score`.
    ///
    /// Default: 5.
    pub fallback_top_n: usize,

    /// Run the feature enrichment pass. Default: true.
    pub enrich: bool,

    /// In-flight competitors during enrichment. Default: 4.
    pub enrichment_workers: usize,

    /// Search results requested per competitor during enrichment. Default: 3.
    pub enrichment_results: usize,

    /// Pages fetched per competitor during enrichment. Default: 2.
    pub enrichment_pages: usize,

    /// Characters of page text sent to one feature extraction. Default: 30 000.
    pub enrichment_char_budget: usize,

    /// Shortest feature kept from enrichment, in characters. Default: 4.
    pub min_feature_chars: usize,

    /// Generate the summary/insights section. Default: true.
    pub summarize: bool,

    /// Timeout applied to each completion call, in seconds. Default: 60.
    pub llm_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_results_per_query: 10,
            search_workers: 5,
            max_fetch_pages: 10,
            fetch_workers: 8,
            max_sources: 20,
            extraction_workers: 4,
            source_char_budget: 50_000,
            min_score: 6,
            fallback_top_n: 5,
            enrich: true,
            enrichment_workers: 4,
            enrichment_results: 3,
            enrichment_pages: 2,
            enrichment_char_budget: 30_000,
            min_feature_chars: 4,
            summarize: true,
            llm_timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the completion model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the validation threshold.
    pub fn with_min_score(mut self, min_score: u8) -> Self {
        self.min_score = min_score;
        self
    }

    /// Enable or disable feature enrichment.
    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enrich = enabled;
        self
    }

    /// Enable or disable the insights section.
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.summarize = enabled;
        self
    }

    /// Set the per-call completion timeout.
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Per-call completion timeout.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.search_workers, 5);
        assert_eq!(config.extraction_workers, 4);
        assert_eq!(config.enrichment_workers, 4);
        assert_eq!(config.source_char_budget, 50_000);
        assert_eq!(config.min_score, 6);
        assert_eq!(config.llm_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"min_score": 8, "enrich": false}"#).unwrap();
        assert_eq!(config.min_score, 8);
        assert!(!config.enrich);
        assert_eq!(config.max_sources, 20);
    }
}
