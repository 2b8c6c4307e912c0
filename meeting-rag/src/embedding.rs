//! Embedding capability: text in, fixed-length vector out.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into a vector embedding.
///
/// The dimensionality is fixed per deployment and must match the
/// [`FragmentStore`](crate::FragmentStore) the vectors are compared against;
/// [`Retriever::new`](crate::Retriever::new) enforces this.
///
/// # Example
///
/// ```rust,ignore
/// use meeting_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("high priority action items").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially. Override it when the backend batches natively.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
