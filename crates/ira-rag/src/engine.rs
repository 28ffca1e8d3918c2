//! RAG pipeline: retrieve then generate

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error, info_span, Instrument};

use ira_core::{
    Chunk, ConversationState, GenerationConfig, LLMProvider, PromptTemplate, RagEngine, RunConfig,
    VectorStore, DEFAULT_TOP_K, Error, Result,
};

/// Template variable holding the user's question
pub const QUESTION_VARIABLE: &str = "question";
/// Template variable holding the retrieved context
pub const CONTEXT_VARIABLE: &str = "context";

/// Steps of a turn, run in this order with no branching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieve,
    Generate,
}

impl Stage {
    pub const SEQUENCE: [Stage; 2] = [Stage::Retrieve, Stage::Generate];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Retrieve => "retrieve",
            Stage::Generate => "generate",
        }
    }
}

/// RAG engine over a vector store, a prompt template and a chat model
pub struct RagPipeline<V: VectorStore, L: LLMProvider> {
    vector_store: V,
    prompt: PromptTemplate,
    llm: L,
    top_k: usize,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl<V: VectorStore, L: LLMProvider> RagPipeline<V, L> {
    /// Create a pipeline; the prompt must use both `{question}` and `{context}`
    pub fn new(vector_store: V, prompt: PromptTemplate, llm: L) -> Result<Self> {
        let variables = prompt.input_variables();
        for required in [QUESTION_VARIABLE, CONTEXT_VARIABLE] {
            if !variables.iter().any(|v| v == required) {
                return Err(Error::Configuration(format!(
                    "prompt template does not use the '{}' variable (found: {:?})",
                    required, variables
                )));
            }
        }

        Ok(Self {
            vector_store,
            prompt,
            llm,
            top_k: DEFAULT_TOP_K,
            temperature: None,
            max_tokens: None,
        })
    }

    /// Set how many chunks are retrieved per question (at least one)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Override the model's sampling temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the length of generated answers, in tokens
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Generation settings sent with every answer request
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..GenerationConfig::for_model(self.llm.model_id())
        }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Join chunk contents into the context block sent to the model
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl<V: VectorStore + 'static, L: LLMProvider + 'static> RagEngine for RagPipeline<V, L> {
    async fn retrieve(&self, state: ConversationState) -> Result<ConversationState> {
        let question = state.require_question()?;

        let context = self
            .vector_store
            .similarity_search(question, self.top_k)
            .await
            .map_err(|e| {
                error!(error = %e, "retrieval failed");
                e
            })?;

        debug!(
            retrieved = context.len(),
            chunks = ?context.iter().map(Chunk::id).collect::<Vec<_>>(),
            "retrieved context"
        );

        Ok(ConversationState {
            context: Some(context),
            ..state
        })
    }

    async fn generate(&self, state: ConversationState) -> Result<ConversationState> {
        let (question, context) = state.require_context()?;

        let docs_content = Self::build_context(context);
        let values = HashMap::from([
            (QUESTION_VARIABLE, question),
            (CONTEXT_VARIABLE, docs_content.as_str()),
        ]);
        let messages = self.prompt.render(&values)?;

        let generation = self.generation_config();
        let response = self.llm.chat_with_config(&messages, &generation).await.map_err(|e| {
            error!(error = %e, model = self.llm.model_id(), "generation failed");
            e
        })?;

        debug!(chars = response.text.chars().count(), "generated answer");

        Ok(ConversationState {
            answer: Some(response.text),
            ..state
        })
    }

    async fn invoke(&self, question: &str, config: &RunConfig) -> Result<ConversationState> {
        let span = info_span!("turn", thread_id = %config.thread_id);

        async move {
            let mut state = ConversationState::from_question(question);
            for stage in Stage::SEQUENCE {
                state = match stage {
                    Stage::Retrieve => self.retrieve(state).await?,
                    Stage::Generate => self.generate(state).await?,
                };
                debug!(stage = stage.name(), "stage complete");
            }
            Ok(state)
        }
        .instrument(span)
        .await
    }
}
