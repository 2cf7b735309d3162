//! Market insights over the final competitor set. Best effort, never fails.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::attempt::{attempt, complete, Stage, UnitOfWork};
use super::extract::coerce_string_list;
use super::json_repair::parse_lenient;
use super::prompts::{format_insights_prompt, INSIGHTS_SYSTEM_PROMPT};
use crate::error::Result;
use crate::traits::llm::{CompletionModel, Message};
use crate::types::analysis::{Insights, Recommendation};
use crate::types::competitor::Competitor;
use crate::types::config::PipelineConfig;

/// Features listed in the frequency table.
pub const TOP_FEATURES: usize = 15;

/// Features shown per competitor in the prompt.
const FEATURES_PER_COMPETITOR: usize = 10;

/// Count how many competitors list each feature.
///
/// Top `limit` by count descending; ties keep first appearance.
pub fn feature_frequency(competitors: &[Competitor], limit: usize) -> Vec<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for feature in competitors.iter().flat_map(|c| c.features.iter()) {
        *counts.entry(feature.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(feature, count)| (feature.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InsightsReply {
    summary: Value,
    market_stage: Value,
    must_have_features: Value,
    differentiators: Value,
    recommendations: Value,
    risks: Value,
}

impl InsightsReply {
    fn into_insights(self) -> Insights {
        Insights {
            summary: text(&self.summary),
            market_stage: text(&self.market_stage),
            must_have_features: coerce_string_list(&self.must_have_features),
            differentiators: coerce_string_list(&self.differentiators),
            recommendations: recommendations(&self.recommendations),
            risks: coerce_string_list(&self.risks),
        }
    }
}

fn text(value: &Value) -> String {
    value.as_str().map(str::trim).unwrap_or_default().to_string()
}

/// Recommendations may come back as objects or bare strings.
fn recommendations(value: &Value) -> Vec<Recommendation> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(Recommendation {
                title: s.trim().to_string(),
                detail: String::new(),
            }),
            Value::Object(map) => Some(Recommendation {
                title: first_text(map, &["title", "name"]),
                detail: first_text(map, &["detail", "description", "content"]),
            }),
            _ => None,
        })
        .filter(|r| !r.title.is_empty() || !r.detail.is_empty())
        .collect()
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn describe_competitors(competitors: &[Competitor]) -> String {
    competitors
        .iter()
        .map(|c| {
            let features: Vec<&str> = c
                .features
                .iter()
                .take(FEATURES_PER_COMPETITOR)
                .map(String::as_str)
                .collect();
            format!("- {}（评分 {}）：{}", c.name, c.score, features.join("、"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_frequency(frequency: &[(String, usize)]) -> String {
    if frequency.is_empty() {
        return "无".to_string();
    }
    frequency
        .iter()
        .map(|(feature, count)| format!("- {}：{}", feature, count))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate market insights for the final competitor set.
///
/// No competitors means no model call. Any failure yields
/// [`Insights::unavailable`].
pub async fn summarize<L>(
    competitors: &[Competitor],
    domain: Option<&str>,
    features: Option<&str>,
    product_name: &str,
    llm: &L,
    config: &PipelineConfig,
) -> Insights
where
    L: CompletionModel + ?Sized,
{
    if competitors.is_empty() {
        return Insights::no_competitors();
    }

    let frequency = feature_frequency(competitors, TOP_FEATURES);
    let messages = [
        Message::system(INSIGHTS_SYSTEM_PROMPT),
        Message::user(format_insights_prompt(
            product_name,
            domain,
            features,
            &describe_competitors(competitors),
            &describe_frequency(&frequency),
        )),
    ];

    let insights = attempt(
        UnitOfWork::new(Stage::Summary, product_name),
        request_insights(llm, &messages, config),
        Insights::unavailable(),
    )
    .await;

    info!(
        recommendations = insights.recommendations.len(),
        "Insights generated"
    );
    insights
}

async fn request_insights<L>(
    llm: &L,
    messages: &[Message],
    config: &PipelineConfig,
) -> Result<Insights>
where
    L: CompletionModel + ?Sized,
{
    let reply = complete(llm, messages, config).await?;
    let parsed: InsightsReply = parse_lenient(&reply)?;
    Ok(parsed.into_insights())
}
