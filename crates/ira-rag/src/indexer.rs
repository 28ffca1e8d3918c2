//! Startup indexing: load, chunk, embed

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use ira_core::{Embedder, IndexingConfig, IndexingResult, Result, VectorStore};

use crate::chunker::RecursiveChunker;
use crate::loader::KnowledgeBaseLoader;
use crate::vector_store::InMemoryVectorStore;

/// Builds the vector store for a knowledge base directory
pub struct KnowledgeBaseIndexer {
    loader: KnowledgeBaseLoader,
    config: IndexingConfig,
    embedder: Arc<dyn Embedder>,
}

impl KnowledgeBaseIndexer {
    pub fn new(directory: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            loader: KnowledgeBaseLoader::new(directory),
            config: IndexingConfig::default(),
            embedder,
        }
    }

    pub fn with_config(mut self, config: IndexingConfig) -> Self {
        self.config = config;
        self
    }

    /// Index the whole knowledge base.
    ///
    /// Any failure is fatal: nothing is returned unless every chunk was
    /// embedded.
    pub async fn index(&self) -> Result<(InMemoryVectorStore, IndexingResult)> {
        let chunker = RecursiveChunker::from_config(&self.config)?;
        let loaded = self.loader.load()?;

        let chunks = chunker.split_documents(&loaded.documents);
        if chunks.is_empty() {
            warn!(
                directory = %self.loader.directory().display(),
                "knowledge base documents are empty; nothing to retrieve"
            );
        }

        let store =
            InMemoryVectorStore::from_chunks(chunks, self.embedder.clone(), self.config.batch_size)
                .await?;

        let result = IndexingResult {
            documents_indexed: loaded.documents.len(),
            files_skipped: loaded.skipped.len(),
            chunks_indexed: store.len(),
            embedding_dims: store.dimensions(),
        };

        info!(
            directory = %self.loader.directory().display(),
            documents = result.documents_indexed,
            skipped = result.files_skipped,
            chunks = result.chunks_indexed,
            dims = result.embedding_dims,
            "indexed knowledge base"
        );

        Ok((store, result))
    }
}
