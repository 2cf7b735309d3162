//! Merge and deduplicate candidates (the reduce step).

use std::sync::LazyLock;

use indexmap::map::Entry;
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::types::competitor::{Competitor, CompetitorCandidate, MAX_SCORE, MIN_SCORE};

/// Parenthesized segments, half- or full-width, e.g. `Notion（笔记）`.
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（][^)）]*[)）]").expect("valid regex"));

/// Generic UI and navigation terms the extractor sometimes mistakes for
/// product names. Compared against the lowercased normalized name.
pub const NAME_BLOCKLIST: &[&str] = &[
    "首页",
    "登录",
    "注册",
    "产品",
    "平台",
    "官网",
    "下载",
    "关于我们",
    "联系我们",
    "帮助中心",
    "解决方案",
    "免费试用",
    "立即体验",
    "价格",
    "更多",
    "其他",
    "home",
    "login",
    "sign in",
    "sign up",
    "register",
    "download",
    "about",
    "contact",
    "pricing",
    "product",
    "products",
    "platform",
];

/// Shortest accepted name, in characters.
const MIN_NAME_CHARS: usize = 2;

/// Clean a candidate name, or reject it.
///
/// Removes parenthesized segments and surrounding whitespace. Rejects empty
/// names, names shorter than two characters and blocklisted terms.
pub fn normalize_name(name: &str) -> Option<String> {
    let cleaned = PARENTHESIZED.replace_all(name, "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() < MIN_NAME_CHARS {
        return None;
    }
    if NAME_BLOCKLIST.contains(&cleaned.to_lowercase().as_str()) {
        return None;
    }
    Some(cleaned.to_string())
}

/// Merge candidates into unique competitors keyed by lowercased name.
///
/// On collision features are unioned, and score and reason are replaced only
/// when the new score is strictly greater. Output keeps first-seen order.
pub fn merge(candidates: impl IntoIterator<Item = CompetitorCandidate>) -> Vec<Competitor> {
    let mut merged: IndexMap<String, Competitor> = IndexMap::new();
    let mut seen = 0usize;

    for candidate in candidates {
        seen += 1;
        let Some(name) = normalize_name(&candidate.name) else {
            debug!(name = %candidate.name, "Rejected candidate name");
            continue;
        };
        let score = candidate.score.clamp(MIN_SCORE, MAX_SCORE);
        let features = candidate
            .features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        match merged.entry(name.to_lowercase()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.add_features(features);
                if score > existing.score {
                    existing.score = score;
                    existing.reason = candidate.reason;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Competitor {
                    name,
                    features: features.collect(),
                    score,
                    reason: candidate.reason,
                });
            }
        }
    }

    debug!(candidates = seen, competitors = merged.len(), "Merged candidates");
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(competitors: &[Competitor]) -> Vec<&str> {
        competitors.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_normalize_strips_parentheses() {
        assert_eq!(normalize_name("Notion（笔记软件）").as_deref(), Some("Notion"));
        assert_eq!(normalize_name(" 飞书 (Lark) ").as_deref(), Some("飞书"));
        assert_eq!(normalize_name("语雀（阿里)").as_deref(), Some("语雀"));
    }

    #[test]
    fn test_normalize_rejects() {
        assert_eq!(normalize_name(""), None);
        assert_eq!(normalize_name("X"), None);
        assert_eq!(normalize_name("（全部）"), None);
        assert_eq!(normalize_name("首页"), None);
        assert_eq!(normalize_name("Login"), None);
        assert_eq!(normalize_name("官网 (官方)"), None);
    }

    #[test]
    fn test_case_insensitive_merge_unions_features() {
        let merged = merge(vec![
            CompetitorCandidate::new("Acme").with_features(["a", "b"]).with_score(6),
            CompetitorCandidate::new("acme").with_features(["b", "c"]).with_score(4),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Acme");
        let features: Vec<_> = merged[0].features.iter().map(String::as_str).collect();
        assert_eq!(features, vec!["a", "b", "c"]);
        assert_eq!(merged[0].score, 6);
    }

    #[test]
    fn test_score_replaced_only_when_strictly_greater() {
        let merged = merge(vec![
            CompetitorCandidate::new("Notion").with_score(7).with_reason("first"),
            CompetitorCandidate::new("notion").with_score(7).with_reason("tie"),
            CompetitorCandidate::new("NOTION").with_score(9).with_reason("best"),
            CompetitorCandidate::new("Notion").with_score(8).with_reason("lower"),
        ]);

        assert_eq!(merged[0].score, 9);
        assert_eq!(merged[0].reason, "best");
    }

    #[test]
    fn test_blocklisted_never_survive() {
        let merged = merge(vec![
            CompetitorCandidate::new("登录"),
            CompetitorCandidate::new("下载（App）"),
            CompetitorCandidate::new("Obsidian"),
        ]);
        assert_eq!(names(&merged), vec!["Obsidian"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = merge(vec![
            CompetitorCandidate::new("Notion (US)").with_features(["db"]),
            CompetitorCandidate::new("notion").with_features(["wiki"]),
            CompetitorCandidate::new("飞书").with_features(["chat"]),
        ]);
        let twice = merge(once.clone().into_iter().map(Competitor::into_candidate));

        assert_eq!(names(&once), names(&twice));
        assert_eq!(once, twice);
    }
}
