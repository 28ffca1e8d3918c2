//! In-memory vector store with brute-force cosine search

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, error, info};

use ira_core::{
    cosine_similarity, Chunk, Embedder, IndexEntry, ScoredChunk, VectorStore,
    Error, Result,
};

/// Vector store holding every chunk and its embedding in memory.
///
/// The store is built once from a complete chunk list and never modified.
pub struct InMemoryVectorStore {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn Embedder>,
    dimensions: usize,
}

impl InMemoryVectorStore {
    /// Embed `chunks` in batches of `batch_size` and build the store.
    ///
    /// Fails as a whole if any batch cannot be embedded or the service
    /// returns vectors of differing dimensions.
    pub async fn from_chunks(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Configuration("batch_size must be > 0".to_string()));
        }

        let mut entries = Vec::with_capacity(chunks.len());
        let mut dimensions = 0;
        let mut pending = chunks.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<Chunk> = pending.by_ref().take(batch_size).collect();
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();

            let embeddings = embedder.embed_documents(&texts).await.map_err(|e| {
                error!(error = %e, batch = texts.len(), "embedding failed");
                e
            })?;

            if embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            for (chunk, embedding) in batch.into_iter().zip(embeddings) {
                if dimensions == 0 {
                    dimensions = embedding.len();
                }
                if embedding.is_empty() || embedding.len() != dimensions {
                    return Err(Error::Embedding(format!(
                        "inconsistent embedding dimensions for {}: expected {}, got {}",
                        chunk.id(),
                        dimensions,
                        embedding.len()
                    )));
                }
                entries.push(IndexEntry { chunk, embedding });
            }

            debug!(embedded = entries.len(), "embedded batch");
        }

        info!(
            chunks = entries.len(),
            dims = dimensions,
            model = embedder.model_name(),
            "built in-memory vector index"
        );

        Ok(Self {
            entries,
            embedder,
            dimensions,
        })
    }

    /// Embedding dimension shared by every entry (0 when empty)
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn similarity_search_with_score(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;
        if query_embedding.len() != self.dimensions {
            return Err(Error::Embedding(format!(
                "query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        // sort_by is stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
