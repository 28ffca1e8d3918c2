//! Ollama integration for the knowledge-base RAG assistant
//!
//! This crate provides the Ollama implementation of the LLMProvider and
//! Embedder traits.

mod client;
mod config;


pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use ira_core::{
    LLMProvider, Embedder, ChatMessage, GenerationConfig, GenerationResult,
    Error, Result,
};
