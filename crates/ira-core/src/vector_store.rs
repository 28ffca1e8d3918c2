//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Chunk, Result, ScoredChunk};

/// A chunk stored alongside its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Trait for vector stores queried by semantic similarity
///
/// Stores are read-only once built; results are ordered by descending
/// similarity to the query.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the `k` chunks most similar to `query`, with their scores
    async fn similarity_search_with_score(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>>;

    /// Return the `k` chunks most similar to `query`
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let scored = self.similarity_search_with_score(query, k).await?;
        Ok(scored.into_iter().map(|s| s.chunk).collect())
    }

    /// Get the total number of stored chunks
    fn len(&self) -> usize;

    /// Check whether the store holds no chunks
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
