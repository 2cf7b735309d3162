//! Competitor Discovery Library
//!
//! Given a product domain, a feature description, or a product name, discovers
//! competing products on the open web and summarizes the market around them.
//!
//! # Pipeline
//!
//! 1. Generate search queries with an LLM (deterministic fallback on failure)
//! 2. Fan the queries out to a web searcher, dedupe by URL, rank list-style pages first
//! 3. Fetch the top pages as markdown
//! 4. Extract candidate competitors from each source with an LLM
//! 5. Merge candidates by normalized name and filter by score
//! 6. Enrich every competitor with a feature search of its own
//! 7. Summarize the market: stage, must-have features, differentiators, risks
//!
//! Every step that talks to an external service degrades to a safe fallback
//! instead of failing the run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use competitor_scout::{AnalysisRequest, AnspireSearcher, CompetitorScout, JinaReader};
//! use competitor_scout::ai::OpenAIChat;
//!
//! let scout = CompetitorScout::new(
//!     AnspireSearcher::new(search_key),
//!     JinaReader::new(),
//!     OpenAIChat::new(llm_key),
//! );
//!
//! let request = AnalysisRequest::new("Notion").with_domain("笔记软件");
//! let result = scout.run(&request).await?;
//! println!("{}", result.message());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (WebSearcher, ContentFetcher, CompletionModel)
//! - [`types`] - Requests, sources, competitors, insights
//! - [`pipeline`] - The discovery stages and the orchestrator
//! - [`searchers`] - Web searcher implementations (Anspire)
//! - [`fetchers`] - Content fetcher implementations (Jina Reader)
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod searchers;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{Result, ScoutError};
pub use traits::{
    fetcher::ContentFetcher,
    llm::{CompletionModel, Message, Role},
    searcher::WebSearcher,
};
pub use types::{
    analysis::{AnalysisRequest, AnalysisResult, Insights, Recommendation},
    competitor::{Competitor, CompetitorCandidate},
    config::PipelineConfig,
    query::{QueryKind, SearchQuery},
    source::{FetchedContent, SearchResult, Source, SourceLink, SourceOrigin},
};

// Re-export the orchestrator and progress reporting
pub use pipeline::{CompetitorScout, ProgressEvent};

// Re-export collaborators
pub use fetchers::JinaReader;
pub use searchers::AnspireSearcher;
pub use security::{SecretString, ServiceCredentials};

// Re-export testing utilities
pub use testing::{MockFetcher, MockLlm, MockWebSearcher};
