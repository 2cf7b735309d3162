//! Query generation.
//!
//! Asks the model for search queries and normalizes whatever shape comes
//! back into [`SearchQuery`] values. Falls back to a single ranking query
//! when the model fails or returns nothing usable.

use indexmap::IndexSet;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::attempt::{attempt, complete, Stage, UnitOfWork};
use super::json_repair::parse_lenient;
use super::prompts::{format_query_prompt, QUERY_SYSTEM_PROMPT};
use crate::error::Result;
use crate::traits::llm::{CompletionModel, Message};
use crate::types::analysis::non_blank;
use crate::types::config::PipelineConfig;
use crate::types::query::{QueryKind, SearchQuery};

/// Label of the fallback query.
pub const FALLBACK_QUERY_NAME: &str = "竞品排名";

/// Keys that may hold the query text in an object element, by priority.
const QUERY_KEYS: [&str; 4] = ["query", "text", "search", "q"];

/// One element of the model's query list, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawQuery {
    /// A bare query string
    Text(String),

    /// An object with the query under one of several keys
    Object(Map<String, Value>),

    /// Anything else (numbers, nested arrays, ...)
    Other(Value),
}

impl RawQuery {
    /// Resolve into a query, or `None` when nothing usable remains.
    pub fn resolve(self) -> Option<SearchQuery> {
        let query = match self {
            Self::Text(text) => SearchQuery::new(text.trim()),
            Self::Object(map) => resolve_object(map),
            Self::Other(Value::Null) => return None,
            Self::Other(value) => SearchQuery::new(value.to_string()),
        };
        (!query.query.trim().is_empty()).then_some(query)
    }
}

fn resolve_object(map: Map<String, Value>) -> SearchQuery {
    let text = QUERY_KEYS.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });

    let Some(text) = text else {
        return SearchQuery::new(Value::Object(map).to_string());
    };

    let kind = map
        .get("type")
        .and_then(Value::as_str)
        .map(QueryKind::from_label)
        .unwrap_or_default();
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let query = SearchQuery::new(text).with_kind(kind);
    match name {
        Some(name) => query.with_name(name),
        None => query,
    }
}

/// Reply shapes accepted from the model.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryReply {
    Envelope {
        #[serde(default)]
        queries: Vec<RawQuery>,
    },
    List(Vec<RawQuery>),
}

impl QueryReply {
    fn into_items(self) -> Vec<RawQuery> {
        match self {
            Self::Envelope { queries } => queries,
            Self::List(items) => items,
        }
    }
}

/// Normalize raw elements: resolve, drop blanks, drop exact duplicates.
pub fn normalize_queries(raw: impl IntoIterator<Item = RawQuery>) -> Vec<SearchQuery> {
    let mut seen = IndexSet::new();
    raw.into_iter()
        .filter_map(RawQuery::resolve)
        .filter(|q| seen.insert(q.query.clone()))
        .collect()
}

/// The single query used when generation fails.
///
/// The subject is the product name, else the domain, else the features text.
pub fn fallback_queries(
    product_name: &str,
    domain: Option<&str>,
    features: Option<&str>,
) -> Vec<SearchQuery> {
    let subject = non_blank(Some(product_name))
        .or(non_blank(domain))
        .or(non_blank(features))
        .unwrap_or_default();

    vec![SearchQuery::new(format!("{} 竞品 排名 Top10", subject))
        .with_kind(QueryKind::Auto)
        .with_name(FALLBACK_QUERY_NAME)]
}

/// Generate search queries for a domain and/or feature description.
///
/// Returns `[]` when both `domain` and `features` are absent or blank.
pub async fn generate_queries<L>(
    domain: Option<&str>,
    features: Option<&str>,
    product_name: &str,
    llm: &L,
    config: &PipelineConfig,
) -> Vec<SearchQuery>
where
    L: CompletionModel + ?Sized,
{
    let domain = non_blank(domain);
    let features = non_blank(features);
    if domain.is_none() && features.is_none() {
        debug!("No domain or features given, skipping query generation");
        return Vec::new();
    }

    let messages = [
        Message::system(QUERY_SYSTEM_PROMPT),
        Message::user(format_query_prompt(domain, features, product_name)),
    ];

    let queries = attempt(
        UnitOfWork::new(Stage::QueryGeneration, product_name),
        request_queries(llm, &messages, config),
        Vec::new(),
    )
    .await;

    if queries.is_empty() {
        info!(product = product_name, "Using fallback ranking query");
        return fallback_queries(product_name, domain, features);
    }

    info!(count = queries.len(), "Generated search queries");
    queries
}

async fn request_queries<L>(
    llm: &L,
    messages: &[Message],
    config: &PipelineConfig,
) -> Result<Vec<SearchQuery>>
where
    L: CompletionModel + ?Sized,
{
    let reply = complete(llm, messages, config).await?;
    let parsed: QueryReply = parse_lenient(&reply)?;
    Ok(normalize_queries(parsed.into_items()))
}
