//! Fragment store trait for storing and searching fragment embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fragment::{Fragment, FragmentFilter, RetrievalResult};

/// A fragment together with its embedding, as handed to [`FragmentStore::upsert`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FragmentPoint {
    /// Point identifier. Upserting an existing id replaces the point.
    pub id: String,
    pub vector: Vec<f32>,
    pub fragment: Fragment,
    /// Name of the interchange file the point was loaded from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// Summary of a store's contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreStats {
    pub total_points: usize,
    pub vector_size: usize,
    pub distance: String,
}

/// A storage backend for fragment embeddings with filtered similarity search.
///
/// # Example
///
/// ```rust,ignore
/// use meeting_rag::{FragmentFilter, FragmentStore, InMemoryFragmentStore};
///
/// let store = InMemoryFragmentStore::new(384);
/// store.upsert(&points).await?;
/// let results = store.search(&query_embedding, &FragmentFilter::new(), 10).await?;
/// ```
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Insert or replace a batch of points. Vectors must match [`dimensions`](Self::dimensions).
    async fn upsert(&self, points: &[FragmentPoint]) -> Result<()>;

    /// Return up to `limit` fragments matching `filter`, ordered by
    /// descending similarity to `embedding`.
    ///
    /// An empty store or a filter nothing satisfies yields an empty vector,
    /// not an error.
    async fn search(
        &self,
        embedding: &[f32],
        filter: &FragmentFilter,
        limit: usize,
    ) -> Result<Vec<RetrievalResult>>;

    /// Current point count and vector configuration.
    async fn stats(&self) -> Result<StoreStats>;

    /// The configured vector size.
    fn dimensions(&self) -> usize;
}
