//! Parallel retriever.
//!
//! Dispatches one hybrid search per target partition concurrently and
//! normalizes the heterogeneous per-partition responses into a common
//! passage shape. A failing partition contributes an empty result and
//! is recorded as an explicit failure; it never fails the turn.

use crate::registry::PartitionRegistry;
use crate::store::{StoreError, VectorSearch};
use mevzuat_core::{AppError, AppResult};
use serde::Serialize;

/// Result limit when exactly one partition is targeted.
pub const SINGLE_PARTITION_LIMIT: usize = 4;

/// Per-partition result limit when fanning out across partitions,
/// bounding total context size regardless of fan-out width.
pub const MULTI_PARTITION_LIMIT: usize = 2;

/// Fixed blend weight between vector similarity and keyword matching.
pub const HYBRID_ALPHA: f32 = 0.5;

/// One retrieved passage, tagged with its partition of origin.
#[derive(Debug, Clone, Serialize)]
pub struct PassageResult {
    /// Passage text
    pub content: String,

    /// Source document file name
    pub source_file: String,

    /// Page number within the source document (1-based)
    pub page_number: u32,

    /// Key of the partition this passage came from
    pub partition_key: String,

    /// Rank within its partition's result set (1-based)
    pub relevance_order: usize,
}

/// Aggregate outcome of a retrieval fan-out.
///
/// Failures are kept separate from passages so that "empty because the
/// search failed" stays distinguishable from "empty because nothing
/// matched", even though both degrade identically for the caller.
#[derive(Debug)]
pub struct RetrievalOutcome {
    /// Union of all passages, grouped by dispatch order of their
    /// partitions
    pub passages: Vec<PassageResult>,

    /// Partitions whose search failed, with the failure cause
    pub failures: Vec<(String, StoreError)>,
}

impl RetrievalOutcome {
    /// Whether retrieval produced no passages at all.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

/// Per-partition result limit for a given fan-out width.
pub fn limit_for(target_count: usize) -> usize {
    if target_count == 1 {
        SINGLE_PARTITION_LIMIT
    } else {
        MULTI_PARTITION_LIMIT
    }
}

/// Search all target partitions concurrently.
///
/// The calling flow suspends until every dispatched search has
/// completed or failed; there is no partial continuation and no
/// cancellation. The target set must be non-empty (an unresolved
/// classification is expanded to all partitions before this point).
pub async fn retrieve(
    store: &dyn VectorSearch,
    registry: &PartitionRegistry,
    query: &str,
    targets: &[String],
) -> AppResult<RetrievalOutcome> {
    if targets.is_empty() {
        return Err(AppError::Retrieval(
            "Retriever dispatched with an empty target set".to_string(),
        ));
    }

    let limit = limit_for(targets.len());

    tracing::info!(
        targets = targets.len(),
        limit,
        "Dispatching partition searches"
    );

    let searches = targets.iter().map(|key| async move {
        let result = match registry.get(key) {
            Some(partition) => {
                store
                    .hybrid_search(&partition.collection, query, limit, HYBRID_ALPHA)
                    .await
            }
            // The target set is resolved from the registry, so this is
            // a configuration bug; record it as a failed search
            None => Err(StoreError::NotFound(key.clone())),
        };
        (key.clone(), result)
    });

    let outcomes = futures::future::join_all(searches).await;

    let mut passages = Vec::new();
    let mut failures = Vec::new();

    for (key, result) in outcomes {
        match result {
            Ok(hits) => {
                tracing::debug!(partition = %key, hits = hits.len(), "Partition search completed");
                passages.extend(hits.into_iter().enumerate().map(|(i, hit)| PassageResult {
                    content: hit.content,
                    source_file: hit.source_file,
                    page_number: hit.page_number,
                    partition_key: key.clone(),
                    relevance_order: i + 1,
                }));
            }
            Err(e) => {
                tracing::warn!(partition = %key, "Partition search failed: {}", e);
                failures.push((key, e));
            }
        }
    }

    Ok(RetrievalOutcome { passages, failures })
}
