//! Search query types.

use serde::{Deserialize, Serialize};

/// What a generated query is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Competitors in the same domain
    Domain,

    /// Products sharing a specific feature
    Feature,

    /// Produced by a fallback or without a declared intent
    #[default]
    Auto,
}

impl QueryKind {
    /// Parse a free-form label from LLM output. Unknown labels become `Auto`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "domain" | "领域" => Self::Domain,
            "feature" | "features" | "功能" => Self::Feature,
            _ => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Feature => "feature",
            Self::Auto => "auto",
        }
    }
}

/// A query ready to be sent to the search provider.
///
/// Produced once by query generation and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Intent label
    #[serde(rename = "type", default)]
    pub kind: QueryKind,

    /// Human readable label
    #[serde(default)]
    pub name: String,

    /// Literal string sent to the search provider
    pub query: String,
}

impl SearchQuery {
    /// Create an `Auto` query whose label is the query itself.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            kind: QueryKind::Auto,
            name: query.clone(),
            query,
        }
    }

    /// Set the intent label.
    pub fn with_kind(mut self, kind: QueryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the human readable label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
