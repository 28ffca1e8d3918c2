//! RAG (Retrieval-Augmented Generation) engine trait and conversation state

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Chunk, Error, Result};

/// Number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 4;

/// Thread identifier used when the caller does not supply one
pub const DEFAULT_THREAD_ID: &str = "1";

/// The per-turn value threaded through retrieve and generate.
///
/// Each stage consumes a state and returns a new one; nothing is mutated
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub question: Option<String>,
    pub context: Option<Vec<Chunk>>,
    pub answer: Option<String>,
}

impl ConversationState {
    /// A state with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh state seeded with the user's question
    pub fn from_question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            ..Self::default()
        }
    }

    /// The question, or an input error if it is absent
    pub fn require_question(&self) -> Result<&str> {
        self.question
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("Question is required to retrieve context.".to_string()))
    }

    /// The question and a non-empty context, or an input error
    pub fn require_context(&self) -> Result<(&str, &[Chunk])> {
        match (self.question.as_deref(), self.context.as_deref()) {
            (Some(question), Some(context)) if !context.is_empty() => Ok((question, context)),
            _ => Err(Error::InvalidInput(
                "Context and question are required to generate an answer.".to_string(),
            )),
        }
    }
}

/// Per-invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub thread_id: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            thread_id: DEFAULT_THREAD_ID.to_string(),
        }
    }
}

/// Trait for RAG engines
///
/// `invoke` runs retrieve then generate in strict sequence; an error from
/// either stage aborts the turn.
#[async_trait]
pub trait RagEngine: Send + Sync {
    /// Fill `context` with the chunks relevant to `question`
    async fn retrieve(&self, state: ConversationState) -> Result<ConversationState>;

    /// Fill `answer` from `question` and `context`
    async fn generate(&self, state: ConversationState) -> Result<ConversationState>;

    /// Answer a question end to end
    async fn invoke(&self, question: &str, config: &RunConfig) -> Result<ConversationState>;
}
