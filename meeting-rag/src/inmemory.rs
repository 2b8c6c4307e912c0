//! In-memory fragment store using cosine similarity.
//!
//! [`InMemoryFragmentStore`] keeps points in insertion order behind a
//! `tokio::sync::RwLock`. It is the reference backend for development,
//! evaluation runs, and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};
use crate::fragment::{FragmentFilter, RetrievalResult};
use crate::store::{FragmentPoint, FragmentStore, StoreStats};

const BACKEND: &str = "InMemory";

#[derive(Debug, Default)]
struct Points {
    ordered: Vec<FragmentPoint>,
    /// point id → position in `ordered`
    index: HashMap<String, usize>,
}

/// An in-memory fragment store using cosine similarity for search.
///
/// Results are sorted by descending score; equal scores keep insertion
/// order (an upsert that replaces a point keeps the original position).
#[derive(Debug)]
pub struct InMemoryFragmentStore {
    dimensions: usize,
    points: RwLock<Points>,
}

impl InMemoryFragmentStore {
    /// Create an empty store for vectors of the given size.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, points: RwLock::new(Points::default()) }
    }

    fn check_vector(&self, point: &FragmentPoint) -> Result<()> {
        if point.vector.len() != self.dimensions {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!(
                    "point '{}' has {} dimensions, store expects {}",
                    point.id,
                    point.vector.len(),
                    self.dimensions
                ),
            });
        }
        if point.vector.iter().any(|v| !v.is_finite()) {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("point '{}' has non-finite vector components", point.id),
            });
        }
        Ok(())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl FragmentStore for InMemoryFragmentStore {
    async fn upsert(&self, points: &[FragmentPoint]) -> Result<()> {
        for point in points {
            self.check_vector(point)?;
            point.fragment.validate()?;
        }

        let mut store = self.points.write().await;
        for point in points {
            match store.index.get(&point.id).copied() {
                Some(pos) => store.ordered[pos] = point.clone(),
                None => {
                    let pos = store.ordered.len();
                    store.index.insert(point.id.clone(), pos);
                    store.ordered.push(point.clone());
                }
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        filter: &FragmentFilter,
        limit: usize,
    ) -> Result<Vec<RetrievalResult>> {
        if embedding.len() != self.dimensions {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!(
                    "query has {} dimensions, store expects {}",
                    embedding.len(),
                    self.dimensions
                ),
            });
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: "query has non-finite vector components".to_string(),
            });
        }

        let store = self.points.read().await;
        let mut scored: Vec<RetrievalResult> = store
            .ordered
            .iter()
            .filter(|p| filter.matches(&p.fragment))
            .map(|p| RetrievalResult {
                fragment: p.fragment.clone(),
                score: cosine_similarity(&p.vector, embedding),
            })
            .collect();

        // stable: ties stay in insertion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let store = self.points.read().await;
        Ok(StoreStats {
            total_points: store.ordered.len(),
            vector_size: self.dimensions,
            distance: "cosine".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
