//! Relevance filtering with a guaranteed non-empty fallback.

use tracing::info;

use crate::types::competitor::Competitor;

/// How many competitors survive when nothing reaches the threshold.
pub const DEFAULT_FALLBACK_TOP_N: usize = 5;

/// Keep competitors scoring at least `min_score`, sorted by score descending.
///
/// If the threshold would empty a non-empty input, the top 5 by score are
/// returned instead.
pub fn validate(competitors: Vec<Competitor>, min_score: u8) -> Vec<Competitor> {
    validate_with_fallback(competitors, min_score, DEFAULT_FALLBACK_TOP_N)
}

/// [`validate`] with an explicit fallback size.
pub fn validate_with_fallback(
    mut competitors: Vec<Competitor>,
    min_score: u8,
    fallback_top_n: usize,
) -> Vec<Competitor> {
    if competitors.is_empty() {
        return competitors;
    }

    // Stable: equal scores keep merge order.
    competitors.sort_by(|a, b| b.score.cmp(&a.score));

    let total = competitors.len();
    let passing = competitors.iter().filter(|c| c.score >= min_score).count();

    if passing == 0 {
        competitors.truncate(fallback_top_n.max(1));
        info!(
            total,
            min_score,
            kept = competitors.len(),
            "No competitor reached the threshold, keeping top scorers"
        );
        return competitors;
    }

    // Sorted descending, so the passing ones are a prefix.
    competitors.truncate(passing);
    info!(total, min_score, kept = passing, "Validated competitors");
    competitors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(name: &str, score: u8) -> Competitor {
        Competitor::new(name).with_score(score)
    }

    fn scores(competitors: &[Competitor]) -> Vec<u8> {
        competitors.iter().map(|c| c.score).collect()
    }

    #[test]
    fn test_filters_and_sorts() {
        let validated = validate(
            vec![scored("a", 6), scored("b", 9), scored("c", 3), scored("d", 7)],
            6,
        );
        assert_eq!(scores(&validated), vec![9, 7, 6]);
    }

    #[test]
    fn test_low_scores_fall_back_to_top_n() {
        let validated = validate(vec![scored("a", 2), scored("b", 3), scored("c", 4)], 6);
        assert_eq!(scores(&validated), vec![4, 3, 2]);

        let many: Vec<_> = (1..=5)
            .flat_map(|s| [scored("x", s), scored("y", s)])
            .collect();
        assert_eq!(validate(many, 6).len(), DEFAULT_FALLBACK_TOP_N);
    }

    #[test]
    fn test_empty_stays_empty() {
        assert!(validate(Vec::new(), 6).is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let validated = validate(vec![scored("first", 8), scored("second", 8)], 6);
        assert_eq!(validated[0].name, "first");
        assert_eq!(validated[1].name, "second");
    }
}
