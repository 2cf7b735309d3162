//! Request and result of one analysis run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::competitor::Competitor;
use super::source::SourceLink;

/// Summary shown when there were no competitors to analyse.
pub const NO_COMPETITORS_MESSAGE: &str = "未发现竞品，无法生成市场分析";

/// Summary shown when the insights call failed.
pub const INSIGHTS_UNAVAILABLE_MESSAGE: &str = "市场分析生成失败，请稍后重试";

/// What the caller wants analysed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Market or domain description
    #[serde(default)]
    pub domain: Option<String>,

    /// Free-text description of the product's features
    #[serde(default)]
    pub features: Option<String>,

    /// The caller's own product
    #[serde(default)]
    pub product_name: String,
}

impl AnalysisRequest {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.features = Some(features.into());
        self
    }

    /// Trimmed domain, `None` when absent or blank.
    pub fn domain_hint(&self) -> Option<&str> {
        non_blank(self.domain.as_deref())
    }

    /// Trimmed features text, `None` when absent or blank.
    pub fn feature_hint(&self) -> Option<&str> {
        non_blank(self.features.as_deref())
    }

    /// True when there is something to search for.
    pub fn is_searchable(&self) -> bool {
        self.domain_hint().is_some() || self.feature_hint().is_some()
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One recommendation in the insights section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

/// Market-level analysis of the discovered competitors.
///
/// Best effort: every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insights {
    pub summary: String,
    pub market_stage: String,
    pub must_have_features: Vec<String>,
    pub differentiators: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub risks: Vec<String>,
}

impl Insights {
    /// All-empty insights carrying only a summary message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            summary: message.into(),
            ..Default::default()
        }
    }

    /// Returned when there were no competitors to analyse.
    pub fn no_competitors() -> Self {
        Self::with_message(NO_COMPETITORS_MESSAGE)
    }

    /// Returned when the insights call failed.
    pub fn unavailable() -> Self {
        Self::with_message(INSIGHTS_UNAVAILABLE_MESSAGE)
    }
}

/// Outcome of one pipeline run. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub domain: Option<String>,
    pub features: Option<String>,
    pub product_name: String,

    /// Query strings that were sent to the search provider
    pub queries: Vec<String>,

    pub competitors: Vec<Competitor>,
    pub total_count: usize,

    /// Pages the competitors were extracted from
    pub source_links: Vec<SourceLink>,

    pub insights: Insights,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// A well-formed result with no competitors.
    pub fn empty(request: &AnalysisRequest) -> Self {
        Self {
            domain: request.domain.clone(),
            features: request.features.clone(),
            product_name: request.product_name.clone(),
            queries: Vec::new(),
            competitors: Vec::new(),
            total_count: 0,
            source_links: Vec::new(),
            insights: Insights::no_competitors(),
            generated_at: Utc::now(),
        }
    }

    /// Human readable one-line summary of the run.
    pub fn message(&self) -> String {
        let subject = non_blank(self.domain.as_deref())
            .or_else(|| non_blank(self.features.as_deref()))
            .unwrap_or(self.product_name.as_str());
        format!("成功分析 {}，发现 {} 个竞品", subject, self.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_hints_are_none() {
        let request = AnalysisRequest::new("X").with_domain("   ");
        assert_eq!(request.domain_hint(), None);
        assert!(!request.is_searchable());

        let request = request.with_features(" 在线协作 ");
        assert_eq!(request.feature_hint(), Some("在线协作"));
        assert!(request.is_searchable());
    }

    #[test]
    fn test_insights_default_is_empty() {
        let insights: Insights = serde_json::from_str("{}").unwrap();
        assert_eq!(insights, Insights::default());
        assert!(Insights::unavailable().recommendations.is_empty());
        assert_eq!(Insights::no_competitors().summary, NO_COMPETITORS_MESSAGE);
    }

    #[test]
    fn test_empty_result_shape() {
        let request = AnalysisRequest::new("X").with_domain("笔记软件");
        let result = AnalysisResult::empty(&request);
        assert_eq!(result.total_count, 0);
        assert!(result.competitors.is_empty());
        assert_eq!(result.message(), "成功分析 笔记软件，发现 0 个竞品");
    }
}
