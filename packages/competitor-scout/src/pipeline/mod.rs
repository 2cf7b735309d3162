//! Discovery pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Query generation with a normalizing fallback
//! - Parallel search fan-out, URL dedup and ranking
//! - Full-text fetch of the top results
//! - Per-source extraction (map) with JSON repair
//! - Name-keyed merge (reduce) and score validation
//! - Feature enrichment and market insights

pub mod attempt;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod json_repair;
pub mod merge;
pub mod progress;
pub mod prompts;
pub mod queries;
pub mod scout;
pub mod search;
pub mod summarize;
pub mod validate;

pub use attempt::{attempt, within, Stage, UnitOfWork};
pub use enrich::{enrich, feature_query, Enricher};
pub use extract::{
    coerce_score, coerce_string_list, extract_all, extract_from_source, select_sources,
    RawCandidate,
};
pub use fetch::fetch_top;
pub use json_repair::{parse_lenient, strip_code_fence, RepairStrategy};
pub use merge::{merge, normalize_name, NAME_BLOCKLIST};
pub use progress::ProgressEvent;
pub use queries::{fallback_queries, generate_queries, normalize_queries, RawQuery};
pub use scout::CompetitorScout;
pub use search::{dedupe_by_url, rank_results, search_all, search_all_bounded};
pub use summarize::{feature_frequency, summarize};
pub use validate::{validate, validate_with_fallback};
