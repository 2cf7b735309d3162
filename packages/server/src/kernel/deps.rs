//! Collaborator construction for a configured scout.

use std::sync::Arc;

use anyhow::{Context, Result};
use competitor_scout::ai::OpenAIChat;
use competitor_scout::{
    AnspireSearcher, CompetitorScout, CompletionModel, ContentFetcher, JinaReader,
    PipelineConfig, WebSearcher,
};

use crate::config::Config;

/// Scout over type-erased collaborators, so the router can be built over
/// production clients or test mocks alike.
pub type SharedScout =
    CompetitorScout<Arc<dyn WebSearcher>, Arc<dyn ContentFetcher>, Arc<dyn CompletionModel>>;

/// Build a scout from its collaborators.
pub fn scout_from_parts(
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn ContentFetcher>,
    llm: Arc<dyn CompletionModel>,
    pipeline: PipelineConfig,
) -> SharedScout {
    CompetitorScout::with_config(searcher, fetcher, llm, pipeline)
}

/// Build the production scout: Anspire search, Jina Reader, OpenAI-compatible chat.
pub fn build_scout(config: &Config) -> Result<SharedScout> {
    let mut searcher =
        AnspireSearcher::new(config.anspire.api_key.clone()).with_timeout(config.search_timeout);
    if let Some(url) = &config.anspire.base_url {
        searcher = searcher.with_base_url(url);
    }

    let mut fetcher = JinaReader::new().with_timeout(config.fetch_timeout);
    if let Some(url) = &config.jina_reader_url {
        fetcher = fetcher.with_base_url(url);
    }

    let mut llm = OpenAIChat::new(config.llm.api_key.expose());
    if let Some(url) = &config.llm.base_url {
        llm = llm.with_base_url(url);
    }
    let llm = llm
        .with_timeout(config.llm_timeout)
        .context("Failed to configure LLM client")?;

    let pipeline = PipelineConfig::default()
        .with_model(config.llm_model.clone())
        .with_llm_timeout(config.llm_timeout);

    tracing::info!(
        model = %config.llm_model,
        llm_base_url = config.llm.base_url.as_deref().unwrap_or("default"),
        "Scout configured"
    );

    Ok(scout_from_parts(
        Arc::new(searcher),
        Arc::new(fetcher),
        Arc::new(llm),
        pipeline,
    ))
}
