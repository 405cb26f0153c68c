//! Retrieval and routing for the Mevzuat Assistant.
//!
//! This crate implements the retrieval half of the question-answering
//! pipeline:
//! - the partition registry (topic-partitioned knowledge bases)
//! - query classification (keyword router with a model-based fallback)
//! - concurrent hybrid search across the targeted partitions
//! - bounded context assembly for the generation prompt
//! - statute citation extraction from generated answers

pub mod citation;
pub mod classify;
pub mod context;
pub mod registry;
pub mod retrieve;
pub mod store;

mod text;

// Re-export commonly used types
pub use citation::{Citation, StatuteTable};
pub use classify::{classify, resolve_targets, ClassificationDecision, RouteMode};
pub use context::assemble_context;
pub use registry::{Partition, PartitionRegistry};
pub use retrieve::{retrieve, PassageResult, RetrievalOutcome};
pub use store::{SearchHit, StoreError, VectorSearch, WeaviateClient};
