//! Lenient parsing of JSON produced by a language model.
//!
//! Model replies wrap JSON in markdown fences, add prose around it, or get
//! cut off by the token limit. [`parse_lenient`] tries a fixed list of
//! strategies in order and returns the first candidate that deserializes.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, ScoutError};

/// One way of turning a raw reply into a JSON candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// The reply as-is
    Verbatim,

    /// Contents of the first fenced code block
    FencedBlock,

    /// From the first `{` to the last `}`
    EmbeddedObject,

    /// Cut at the last `}` and close whatever is still open
    BalancedTruncation,
}

impl RepairStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [RepairStrategy; 4] = [
        Self::Verbatim,
        Self::FencedBlock,
        Self::EmbeddedObject,
        Self::BalancedTruncation,
    ];

    /// Produce a candidate, or `None` if the strategy does not apply.
    pub fn apply(&self, raw: &str) -> Option<String> {
        match self {
            Self::Verbatim => Some(raw.trim().to_string()).filter(|s| !s.is_empty()),
            Self::FencedBlock => fenced_block(raw).map(str::to_string),
            Self::EmbeddedObject => embedded_object(strip_code_fence(raw)).map(str::to_string),
            Self::BalancedTruncation => balance_truncated(strip_code_fence(raw)),
        }
    }
}

/// Parse `raw` into `T`, trying each [`RepairStrategy`] in order.
pub fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let mut last_error = None;

    for strategy in RepairStrategy::ORDER {
        let Some(candidate) = strategy.apply(raw) else {
            continue;
        };
        match serde_json::from_str::<T>(&candidate) {
            Ok(value) => {
                if strategy != RepairStrategy::Verbatim {
                    debug!(strategy = ?strategy, "Recovered JSON from model output");
                }
                return Ok(value);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(ScoutError::MalformedOutput(match last_error {
        Some(e) => format!("{} (reply starts with {:?})", e, preview(raw)),
        None => "empty reply".to_string(),
    }))
}

/// Inner text of the first fenced block (```` ```json ```` or bare ```` ``` ````),
/// or the trimmed input when there is no fence.
///
/// An unclosed fence (typical of a truncated reply) yields everything after it.
pub fn strip_code_fence(text: &str) -> &str {
    fenced_block(text).unwrap_or_else(|| text.trim())
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_ticks = &text[start + 3..];

    // Skip the info string (e.g. "json") up to the end of the line.
    let body = match after_ticks.find('\n') {
        Some(newline) if is_info_string(&after_ticks[..newline]) => &after_ticks[newline + 1..],
        _ => after_ticks,
    };

    let inner = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    Some(inner.trim())
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Truncate at the last `}` and append the closers still open.
///
/// Returns `None` when there is no object, or when the kept prefix is not
/// structurally sound (mismatched closer, or the cut falls inside a string).
pub fn balance_truncated(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let kept = &text[start..=end];

    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in kept.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                if open.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    if in_string {
        return None;
    }

    let mut repaired = kept.to_string();
    repaired.extend(open.iter().rev());
    Some(repaired)
}

fn preview(raw: &str) -> String {
    raw.chars().take(80).collect()
}
