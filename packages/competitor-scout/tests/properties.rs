//! Property tests for merging and validation.

use competitor_scout::pipeline::{merge, normalize_name, validate, NAME_BLOCKLIST};
use competitor_scout::{Competitor, CompetitorCandidate};
use proptest::prelude::*;

fn candidate() -> impl Strategy<Value = CompetitorCandidate> {
    (
        prop::sample::select(vec!["Notion", "notion", "NOTION", "Obsidian", "语雀", "语雀（阿里）", "首页"]),
        prop::collection::vec("[a-z]{4,8}", 0..4),
        1u8..=10,
    )
        .prop_map(|(name, features, score)| {
            CompetitorCandidate::new(name)
                .with_features(features)
                .with_score(score)
        })
}

proptest! {
    #[test]
    fn merged_names_are_unique(candidates in prop::collection::vec(candidate(), 0..30)) {
        let merged = merge(candidates);
        let mut keys: Vec<String> = merged.iter().map(|c| c.name.to_lowercase()).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), before);
    }

    #[test]
    fn merge_is_idempotent(candidates in prop::collection::vec(candidate(), 0..30)) {
        let once = merge(candidates);
        let twice = merge(once.clone().into_iter().map(Competitor::into_candidate));

        prop_assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            prop_assert_eq!(&a.name, &b.name);
            prop_assert_eq!(a.score, b.score);
            prop_assert_eq!(&a.features, &b.features);
        }
    }

    #[test]
    fn merged_score_is_the_maximum(candidates in prop::collection::vec(candidate(), 1..30)) {
        let merged = merge(candidates.clone());
        for competitor in &merged {
            let best = candidates
                .iter()
                .filter(|c| {
                    normalize_name(&c.name).map(|n| n.to_lowercase())
                        == Some(competitor.name.to_lowercase())
                })
                .map(|c| c.score)
                .max();
            prop_assert_eq!(best, Some(competitor.score));
        }
    }

    #[test]
    fn blocklisted_names_never_survive(candidates in prop::collection::vec(candidate(), 0..30)) {
        let merged = merge(candidates);
        prop_assert!(merged.iter().all(|c| !NAME_BLOCKLIST.contains(&c.name.as_str())));
    }

    #[test]
    fn validate_never_empties_a_non_empty_list(
        scores in prop::collection::vec(1u8..=10, 1..20),
        min_score in 1u8..=10,
    ) {
        let competitors: Vec<Competitor> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| Competitor::new(format!("产品{}", i)).with_score(*s))
            .collect();

        let kept = validate(competitors, min_score);

        prop_assert!(!kept.is_empty());
        prop_assert!(kept.windows(2).all(|w| w[0].score >= w[1].score));
        if scores.iter().any(|s| *s >= min_score) {
            prop_assert!(kept.iter().all(|c| c.score >= min_score));
        }
    }
}
