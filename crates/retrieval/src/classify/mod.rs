//! Query classification (routing).
//!
//! Maps a user query to the partition set that will be searched. The
//! fast keyword classifier runs first and never suspends; when it is
//! inconclusive (no keyword hit, or a tie) the model-based fallback
//! classifier is consulted. Classification can degrade but never fail:
//! any error collapses to `unresolved`, which routes to all partitions.

pub mod fallback;
pub mod fast;

pub use fallback::classify_fallback;
pub use fast::classify_fast;

use crate::registry::PartitionRegistry;
use mevzuat_llm::LlmClient;
use serde::{Deserialize, Serialize};

/// How the routing decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Keyword classifier resolved a single partition
    Fast,
    /// Model classifier resolved a single partition
    Fallback,
    /// No classifier was conclusive; all partitions are searched
    Unresolved,
}

/// The routing decision for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationDecision {
    pub mode: RouteMode,

    /// Resolved partition keys. Empty only when `mode` is
    /// `Unresolved`; callers replace an empty set with the full
    /// registry via [`resolve_targets`].
    pub partition_keys: Vec<String>,
}

impl ClassificationDecision {
    /// The inconclusive decision.
    pub fn unresolved() -> Self {
        Self {
            mode: RouteMode::Unresolved,
            partition_keys: Vec::new(),
        }
    }

    /// Decision for a single resolved partition.
    pub fn single(mode: RouteMode, key: impl Into<String>) -> Self {
        Self {
            mode,
            partition_keys: vec![key.into()],
        }
    }

    /// Whether a partition set was resolved.
    pub fn is_resolved(&self) -> bool {
        !self.partition_keys.is_empty()
    }
}

/// Expand a decision into the non-empty target set the retriever
/// receives: the resolved keys, or every registered partition when the
/// decision is unresolved.
pub fn resolve_targets(
    decision: &ClassificationDecision,
    registry: &PartitionRegistry,
) -> Vec<String> {
    if decision.is_resolved() {
        decision.partition_keys.clone()
    } else {
        registry.keys()
    }
}

/// Classify a query, trying the fast classifier first.
///
/// # Arguments
/// * `query` - Raw user query
/// * `registry` - Partition registry
/// * `llm` - Fallback classifier client
/// * `model` - Model used by the fallback classifier
/// * `use_fast` - Whether the keyword classifier runs first; when
///   false the model classifier is primary
pub async fn classify(
    query: &str,
    registry: &PartitionRegistry,
    llm: &dyn LlmClient,
    model: &str,
    use_fast: bool,
) -> ClassificationDecision {
    if use_fast {
        let decision = classify_fast(query, registry);
        if decision.is_resolved() {
            tracing::info!(partition = %decision.partition_keys[0], "Fast classifier resolved query");
            return decision;
        }
        tracing::debug!("Fast classifier inconclusive, consulting fallback");
    }

    classify_fallback(llm, model, query, registry).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::test_partition;

    #[test]
    fn test_resolve_targets_resolved() {
        let registry = PartitionRegistry::from_partitions(vec![
            test_partition("rent_law", &["kira"]),
            test_partition("labor_law", &["işçi"]),
        ])
        .unwrap();

        let decision = ClassificationDecision::single(RouteMode::Fast, "rent_law");
        assert_eq!(resolve_targets(&decision, &registry), vec!["rent_law"]);
    }

    #[test]
    fn test_resolve_targets_unresolved_fans_out() {
        let registry = PartitionRegistry::from_partitions(vec![
            test_partition("rent_law", &["kira"]),
            test_partition("labor_law", &["işçi"]),
        ])
        .unwrap();

        let decision = ClassificationDecision::unresolved();
        let targets = resolve_targets(&decision, &registry);
        assert_eq!(targets, vec!["rent_law", "labor_law"]);
        assert!(!targets.is_empty());
    }
}
