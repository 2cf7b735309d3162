//! Search results, fetched pages and extraction sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A webpage returned by the search provider.
///
/// `url` is the natural key across search, fetch and extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    #[serde(default)]
    pub title: String,

    /// Page URL
    pub url: String,

    /// Provider snippet
    #[serde(default)]
    pub snippet: String,
}

impl SearchResult {
    /// Create a result with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            url: url.into(),
            snippet: String::new(),
        }
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Title and snippet joined, for keyword heuristics.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

/// Full text of a page, as returned by the content fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedContent {
    /// Requested URL
    pub url: String,

    /// Page title if one was found
    #[serde(default)]
    pub title: String,

    /// Page text (markdown); not trusted unless `success`
    #[serde(default)]
    pub content: String,

    /// Whether the fetch succeeded
    pub success: bool,

    /// Failure description
    #[serde(default)]
    pub error: Option<String>,

    /// When the fetch finished
    pub fetched_at: DateTime<Utc>,
}

impl FetchedContent {
    /// A successful fetch.
    pub fn succeeded(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            success: true,
            error: None,
            fetched_at: Utc::now(),
        }
    }

    /// A failed fetch.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: String::new(),
            success: false,
            error: Some(error.into()),
            fetched_at: Utc::now(),
        }
    }

    /// Content that callers may rely on: only for successful, non-blank fetches.
    pub fn usable_content(&self) -> Option<&str> {
        if self.success && !self.content.trim().is_empty() {
            Some(&self.content)
        } else {
            None
        }
    }
}

/// Where the text of an extraction source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Fetched page text
    FullText,

    /// Search snippet (fetch failed or was not attempted)
    Snippet,
}

/// One input to a single extractor call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    pub text: String,
    pub origin: SourceOrigin,
}

/// A link shown to the caller as evidence for the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    pub url: String,
}

impl From<&Source> for SourceLink {
    fn from(source: &Source) -> Self {
        Self {
            title: source.title.clone(),
            url: source.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_builder() {
        let result = SearchResult::new("https://example.com")
            .with_title("Example")
            .with_snippet("snippet");

        assert_eq!(result.url, "https://example.com");
        assert_eq!(result.searchable_text(), "Example snippet");
    }

    #[test]
    fn test_failed_fetch_has_no_usable_content() {
        let failed = FetchedContent::failed("https://a.com", "timeout");
        assert!(!failed.success);
        assert_eq!(failed.usable_content(), None);

        let blank = FetchedContent::succeeded("https://a.com", "A", "   \n");
        assert_eq!(blank.usable_content(), None);

        let ok = FetchedContent::succeeded("https://a.com", "A", "# A\nbody");
        assert_eq!(ok.usable_content(), Some("# A\nbody"));
    }
}
