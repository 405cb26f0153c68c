//! Vector-store collaborator interface.
//!
//! The pipeline only depends on this trait; the Weaviate client is the
//! production implementation and tests substitute mocks.

mod weaviate;

pub use weaviate::WeaviateClient;

use thiserror::Error;

/// Errors raised by a vector-store search.
///
/// `NotFound` is kept distinct so the retriever can tell "collection is
/// missing" apart from other failures in logs, even though both degrade
/// to an empty result for the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing collection does not exist
    #[error("collection not found: {0}")]
    NotFound(String),

    /// Any other search failure (connection, protocol, malformed data)
    #[error("search failed: {0}")]
    Search(String),
}

/// One raw hit from a hybrid search, before normalization.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Passage text
    pub content: String,

    /// Source document file name
    pub source_file: String,

    /// Page number within the source document (1-based)
    pub page_number: u32,

    /// Blended relevance score
    pub score: f32,
}

/// Hybrid (vector + keyword) search over a single collection.
#[async_trait::async_trait]
pub trait VectorSearch: Send + Sync {
    /// Run a hybrid search against one collection.
    ///
    /// `alpha` is the blend weight between vector similarity and
    /// keyword matching (0.0 = keyword only, 1.0 = vector only).
    /// Results are ordered by descending blended score.
    async fn hybrid_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        alpha: f32,
    ) -> Result<Vec<SearchHit>, StoreError>;
}
