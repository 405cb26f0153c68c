//! Keyword-scoring fast classifier.
//!
//! Counts how many of each partition's keywords occur as substrings in
//! the lower-cased query and picks the partition with the strictly
//! greatest count. Deterministic, no side effects, no suspension.

use crate::classify::{ClassificationDecision, RouteMode};
use crate::registry::PartitionRegistry;
use crate::text::fold;

/// Classify a query by keyword hits.
///
/// Returns `unresolved` when no keyword matches anywhere, and also
/// when two or more partitions tie for the maximum score: a tie is
/// inconclusive and escalates to the fallback classifier rather than
/// letting registration order pick an arbitrary winner.
pub fn classify_fast(query: &str, registry: &PartitionRegistry) -> ClassificationDecision {
    let query_lower = fold(query);

    let mut best: Option<(&str, usize)> = None;
    let mut tied = false;

    for partition in registry.all() {
        let score = partition
            .keywords
            .iter()
            .filter(|keyword| query_lower.contains(&fold(keyword)))
            .count();

        if score == 0 {
            continue;
        }

        match best {
            Some((_, best_score)) if score > best_score => {
                best = Some((&partition.key, score));
                tied = false;
            }
            Some((_, best_score)) if score == best_score => {
                tied = true;
            }
            None => {
                best = Some((&partition.key, score));
            }
            _ => {}
        }
    }

    match best {
        Some((key, score)) if !tied => {
            tracing::debug!(partition = key, score, "Keyword classifier matched");
            ClassificationDecision::single(RouteMode::Fast, key)
        }
        Some(_) => {
            tracing::debug!("Keyword classifier tie, treating as inconclusive");
            ClassificationDecision::unresolved()
        }
        None => ClassificationDecision::unresolved(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::test_partition;

    fn registry() -> PartitionRegistry {
        PartitionRegistry::from_partitions(vec![
            test_partition("rent_law", &["kira", "tahliye", "depozito"]),
            test_partition("labor_law", &["işçi", "tazminat", "kıdem"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_keyword_resolves_partition() {
        let decision = classify_fast("kira artış oranı nedir", &registry());
        assert_eq!(decision.mode, RouteMode::Fast);
        assert_eq!(decision.partition_keys, vec!["rent_law"]);
    }

    #[test]
    fn test_no_keyword_is_unresolved() {
        let decision = classify_fast("miras paylaşımı nasıl yapılır", &registry());
        assert_eq!(decision.mode, RouteMode::Unresolved);
        assert!(decision.partition_keys.is_empty());
    }

    #[test]
    fn test_strict_majority_wins() {
        // Two labor keywords vs one rent keyword
        let decision = classify_fast("işçi kıdem tazminatı ve kira", &registry());
        assert_eq!(decision.partition_keys, vec!["labor_law"]);
    }

    #[test]
    fn test_tie_is_unresolved() {
        // One keyword hit on each side
        let decision = classify_fast("kira ve tazminat", &registry());
        assert_eq!(decision.mode, RouteMode::Unresolved);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let decision = classify_fast("Kira sözleşmesi süresi", &registry());
        assert_eq!(decision.mode, RouteMode::Fast);
        assert_eq!(decision.partition_keys, vec!["rent_law"]);
    }
}
