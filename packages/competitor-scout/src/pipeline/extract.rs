//! Per-source competitor extraction (the map step).
//!
//! Each source is sent to the model on its own; one bad source yields no
//! candidates but never aborts the batch.

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::attempt::{attempt, complete, Stage, UnitOfWork};
use super::json_repair::parse_lenient;
use super::prompts::{format_extract_prompt, EXTRACT_SYSTEM_PROMPT};
use crate::error::Result;
use crate::traits::llm::{CompletionModel, Message};
use crate::types::competitor::{CompetitorCandidate, DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};
use crate::types::config::PipelineConfig;
use crate::types::source::{FetchedContent, SearchResult, Source, SourceOrigin};

/// A competitor entry as the model wrote it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    pub name: Value,
    pub features: Value,
    pub score: Value,
    pub reason: Value,
}

impl RawCandidate {
    /// Coerce into a candidate. Blank or non-string names are dropped.
    pub fn into_candidate(self, source_url: &str) -> Option<CompetitorCandidate> {
        let name = self.name.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let reason = match &self.reason {
            Value::String(s) => s.trim().to_string(),
            _ => String::new(),
        };

        Some(CompetitorCandidate {
            name: name.to_string(),
            features: coerce_string_list(&self.features),
            score: coerce_score(&self.score),
            reason,
            source_url: Some(source_url.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtractionReply {
    Envelope {
        #[serde(default)]
        competitors: Vec<RawCandidate>,
    },
    List(Vec<RawCandidate>),
}

impl ExtractionReply {
    fn into_items(self) -> Vec<RawCandidate> {
        match self {
            Self::Envelope { competitors } => competitors,
            Self::List(items) => items,
        }
    }
}

/// Read a relevance score from whatever the model produced.
///
/// Integers, floats and numeric strings are accepted and clamped into
/// 1..=10; anything else is the default score.
pub fn coerce_score(value: &Value) -> u8 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => {
            n.round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8
        }
        _ => DEFAULT_SCORE,
    }
}

/// Read a list of strings, accepting a single string as a one-element list.
///
/// Entries are trimmed; blanks and non-strings are dropped.
pub fn coerce_string_list(value: &Value) -> Vec<String> {
    let trimmed = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    match value {
        Value::String(s) => trimmed(s).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(trimmed)
            .collect(),
        _ => Vec::new(),
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Choose extraction sources once, before dispatch.
///
/// Full-text sources come first, then snippet-only ones, each tier in ranked
/// order; the whole list is capped at `max_sources`.
pub fn select_sources(
    ranked: &[SearchResult],
    fetched: &IndexMap<String, FetchedContent>,
    max_sources: usize,
) -> Vec<Source> {
    let mut full_text = Vec::new();
    let mut snippets = Vec::new();

    for result in ranked {
        let page = fetched.get(&result.url);
        if let Some(content) = page.and_then(FetchedContent::usable_content) {
            let title = page
                .map(|p| p.title.trim())
                .filter(|t| !t.is_empty())
                .unwrap_or(result.title.as_str());
            full_text.push(Source {
                url: result.url.clone(),
                title: title.to_string(),
                text: collapse_whitespace(content),
                origin: SourceOrigin::FullText,
            });
        } else if !result.snippet.trim().is_empty() {
            snippets.push(Source {
                url: result.url.clone(),
                title: result.title.clone(),
                text: collapse_whitespace(&result.snippet),
                origin: SourceOrigin::Snippet,
            });
        }
    }

    debug!(
        full_text = full_text.len(),
        snippets = snippets.len(),
        max_sources,
        "Selected extraction sources"
    );

    full_text
        .into_iter()
        .chain(snippets)
        .take(max_sources)
        .collect()
}

/// Extract competitor candidates from one source's text.
///
/// Any failure (model error, timeout, unrepairable output) yields `[]`.
pub async fn extract_from_source<L>(
    text: &str,
    source_url: &str,
    domain_hint: Option<&str>,
    feature_hint: Option<&str>,
    llm: &L,
    config: &PipelineConfig,
) -> Vec<CompetitorCandidate>
where
    L: CompletionModel + ?Sized,
{
    if text.trim().is_empty() {
        return Vec::new();
    }

    let content = truncate_chars(text, config.source_char_budget);
    let messages = [
        Message::system(EXTRACT_SYSTEM_PROMPT),
        Message::user(format_extract_prompt(domain_hint, feature_hint, source_url, content)),
    ];

    let candidates = attempt(
        UnitOfWork::new(Stage::Extraction, source_url),
        request_candidates(llm, &messages, source_url, config),
        Vec::new(),
    )
    .await;

    debug!(url = source_url, candidates = candidates.len(), "Source extracted");
    candidates
}

async fn request_candidates<L>(
    llm: &L,
    messages: &[Message],
    source_url: &str,
    config: &PipelineConfig,
) -> Result<Vec<CompetitorCandidate>>
where
    L: CompletionModel + ?Sized,
{
    let reply = complete(llm, messages, config).await?;
    let parsed: ExtractionReply = parse_lenient(&reply)?;
    Ok(parsed
        .into_items()
        .into_iter()
        .filter_map(|raw| raw.into_candidate(source_url))
        .collect())
}

/// Extract from every source with at most `config.extraction_workers` calls
/// in flight. Candidates are returned in source order.
pub async fn extract_all<L>(
    sources: &[Source],
    domain_hint: Option<&str>,
    feature_hint: Option<&str>,
    llm: &L,
    config: &PipelineConfig,
) -> Vec<CompetitorCandidate>
where
    L: CompletionModel + ?Sized,
{
    let batches: Vec<Vec<CompetitorCandidate>> = stream::iter(sources.iter().cloned())
        .map(|source: Source| async move {
            extract_from_source(&source.text, &source.url, domain_hint, feature_hint, llm, config)
                .await
        })
        .buffered(config.extraction_workers.max(1))
        .collect()
        .await;

    let candidates: Vec<CompetitorCandidate> = batches.into_iter().flatten().collect();
    info!(
        sources = sources.len(),
        candidates = candidates.len(),
        "Extraction complete"
    );
    candidates
}
