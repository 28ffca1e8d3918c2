//! Deterministic stand-ins for the embedding service and chat model

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ira_core::{
    Chunk, ChatMessage, Document, Embedder, GenerationConfig, GenerationResult, LLMProvider,
    Error, Result,
};

pub fn chunk(text: &str, start_index: usize) -> Chunk {
    Chunk {
        content: text.to_string(),
        metadata: Document::text("kb/fruit.txt", text).metadata,
        start_index,
    }
}

/// Bag-of-words embedder over a fixed vocabulary
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
        }
    }

    pub fn fruit() -> Self {
        Self::new(&["apples", "bananas", "cherries", "red", "yellow", "color"])
    }

    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        self.vocabulary
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Wraps an embedder and counts calls; can also simulate an outage
pub struct CountingEmbedder {
    inner: Option<KeywordEmbedder>,
    pub document_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(inner: KeywordEmbedder) -> Self {
        Self {
            inner: Some(inner),
            document_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            inner: None,
            document_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    fn inner(&self) -> Result<&KeywordEmbedder> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::Embedding("embedding service unreachable".to_string()))
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.inner()?.embed_documents(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.inner()?.embed_query(text).await
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

/// Chat model that answers with the last message it was sent
#[derive(Default)]
pub struct EchoModel {
    pub calls: AtomicUsize,
    pub last_messages: Mutex<Vec<ChatMessage>>,
    pub last_config: Mutex<Option<GenerationConfig>>,
}

#[async_trait]
impl LLMProvider for EchoModel {
    async fn chat_with_config(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        *self.last_config.lock().unwrap() = Some(config.clone());

        Ok(GenerationResult {
            text: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
            model_id: config.model_id.clone(),
        })
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

/// Chat model whose service is always down
pub struct DownModel;

#[async_trait]
impl LLMProvider for DownModel {
    async fn chat_with_config(
        &self,
        _messages: &[ChatMessage],
        _config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        Err(Error::Network("connection refused".to_string()))
    }

    fn model_id(&self) -> &str {
        "down"
    }
}
