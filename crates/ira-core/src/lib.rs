//! Core traits and types for IRA (knowledge-base RAG assistant)
//!
//! This crate defines the fundamental traits and types used across the IRA system.
//! It provides capability-facing interfaces for chat models, embedders, vector stores,
//! prompt registries and RAG engines, making the system test-friendly and extensible.

pub mod llm;
pub mod embedding;
pub mod rag;
pub mod vector_store;
pub mod document;
pub mod document_indexer;
pub mod prompt;
pub mod error;

pub use error::{Error, Result};
pub use llm::{LLMProvider, ChatMessage, Role, GenerationConfig, GenerationResult};
pub use embedding::{Embedder, cosine_similarity};
pub use rag::{RagEngine, ConversationState, RunConfig, DEFAULT_TOP_K, DEFAULT_THREAD_ID};
pub use vector_store::{VectorStore, IndexEntry};
pub use document::{Document, DocumentMetadata, FileType, Chunk, ScoredChunk};
pub use document_indexer::{IndexingConfig, IndexingResult};
pub use prompt::{PromptProvider, PromptTemplate, MessageTemplate};
