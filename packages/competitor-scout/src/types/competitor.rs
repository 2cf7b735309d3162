//! Competitor entities, before and after merge.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Lowest relevance score.
pub const MIN_SCORE: u8 = 1;

/// Highest relevance score.
pub const MAX_SCORE: u8 = 10;

/// Score assigned when the extractor gives none or an unreadable one.
pub const DEFAULT_SCORE: u8 = 5;

/// A competitor as reported by one extractor call.
///
/// Several candidates may describe the same logical competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorCandidate {
    pub name: String,

    #[serde(default)]
    pub features: Vec<String>,

    /// Relevance, 1..=10
    pub score: u8,

    #[serde(default)]
    pub reason: String,

    /// Page the candidate was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl CompetitorCandidate {
    /// Create a candidate with the default score.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            score: DEFAULT_SCORE,
            reason: String::new(),
            source_url: None,
        }
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Set the score, clamped into 1..=10.
    pub fn with_score(mut self, score: u8) -> Self {
        self.score = score.clamp(MIN_SCORE, MAX_SCORE);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// A merged competitor, unique by lowercased name within one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,

    /// Union of features across sources, in first-seen order
    #[serde(default)]
    pub features: IndexSet<String>,

    /// Highest score any source gave
    pub score: u8,

    /// Reason attached to the highest score
    #[serde(default)]
    pub reason: String,
}

impl Competitor {
    /// Create a competitor with no features and the default score.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: IndexSet::new(),
            score: DEFAULT_SCORE,
            reason: String::new(),
        }
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Set the score, clamped into 1..=10.
    pub fn with_score(mut self, score: u8) -> Self {
        self.score = score.clamp(MIN_SCORE, MAX_SCORE);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Append features not already present. Returns how many were new.
    pub fn add_features(&mut self, features: impl IntoIterator<Item = String>) -> usize {
        let before = self.features.len();
        self.features.extend(features);
        self.features.len() - before
    }

    /// View this competitor as a single candidate (used when re-merging).
    pub fn into_candidate(self) -> CompetitorCandidate {
        CompetitorCandidate {
            name: self.name,
            features: self.features.into_iter().collect(),
            score: self.score,
            reason: self.reason,
            source_url: None,
        }
    }
}
