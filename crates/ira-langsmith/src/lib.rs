//! LangSmith prompt registry integration for the knowledge-base RAG assistant
//!
//! This crate provides the LangSmith implementation of the PromptProvider trait.

mod client;
mod config;
mod manifest;

pub use client::{LangSmithClient, PromptIdentifier};
pub use config::LangSmithConfig;
pub use manifest::prompt_from_manifest;

// Re-export core types for convenience
pub use ira_core::{PromptProvider, PromptTemplate, Error, Result};
