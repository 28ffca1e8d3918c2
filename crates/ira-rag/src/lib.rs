//! Retrieval-augmented generation over a local knowledge base
//!
//! This crate provides the document loader, chunker, in-memory vector store,
//! startup indexer and the retrieve/generate pipeline.

mod chunker;
mod engine;
mod indexer;
mod loader;
mod vector_store;

#[cfg(test)]
mod testing;

pub use chunker::RecursiveChunker;
pub use engine::{RagPipeline, Stage, CONTEXT_VARIABLE, QUESTION_VARIABLE};
pub use indexer::KnowledgeBaseIndexer;
pub use loader::{KnowledgeBaseLoader, LoadedDocuments};
pub use vector_store::InMemoryVectorStore;

// Re-export core types for convenience
pub use ira_core::{
    RagEngine, ConversationState, RunConfig, DEFAULT_TOP_K,
    VectorStore, IndexEntry, Chunk, ScoredChunk, Document,
    IndexingConfig, IndexingResult,
    Error, Result,
};
