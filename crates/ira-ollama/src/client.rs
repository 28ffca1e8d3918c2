//! Ollama client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use ira_core::{
    ChatMessage, Embedder, GenerationConfig, GenerationResult, LLMProvider,
    Error, Result,
};

use crate::config::OllamaConfig;

/// Ollama client serving both chat and embedding requests
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Serialize, Default)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Which endpoint a failure came from, so it maps onto the right error kind
#[derive(Clone, Copy)]
enum Endpoint {
    Chat,
    Embed,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Chat => "api/chat",
            Endpoint::Embed => "api/embed",
        }
    }

    fn error(self, message: String) -> Error {
        match self {
            Endpoint::Chat => Error::LLMProvider(message),
            Endpoint::Embed => Error::Embedding(message),
        }
    }
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url> {
        self.config
            .base_url
            .join(endpoint.path())
            .map_err(|e| Error::Configuration(format!("Invalid Ollama URL: {}", e)))
    }

    /// POST a JSON body and decode the JSON reply
    async fn post<B: Serialize, R: DeserializeOwned>(&self, endpoint: Endpoint, body: &B) -> Result<R> {
        let url = self.url(endpoint)?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!(
                "Ollama connection error (is Ollama running at {}?): {}",
                self.config.base_url, e
            )))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(endpoint.error(format!(
                "Ollama API request failed with status {}: {}",
                status,
                error_message(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Serialization(format!("Unexpected Ollama response from {}: {}", endpoint.path(), e))
        })
    }
}

/// Pull the `error` field out of an Ollama error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Check an embed reply has one vector per input, all of the same width
fn validate_embeddings(embeddings: Vec<Vec<f32>>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if embeddings.len() != expected {
        return Err(Error::Embedding(format!(
            "Ollama returned {} embeddings for {} inputs",
            embeddings.len(),
            expected
        )));
    }

    if let Some(first) = embeddings.first() {
        let dims = first.len();
        if dims == 0 || embeddings.iter().any(|e| e.len() != dims) {
            return Err(Error::Embedding(
                "Ollama returned embeddings of inconsistent dimensions".to_string(),
            ));
        }
    }

    Ok(embeddings)
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn chat_with_config(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let options = (config.temperature.is_some() || config.max_tokens.is_some()).then(|| ChatOptions {
            temperature: config.temperature,
            num_predict: config.max_tokens,
        });

        let request = ChatRequest {
            model: &config.model_id,
            messages,
            stream: false,
            options,
        };

        debug!(model = %config.model_id, messages = messages.len(), "sending chat request");
        let response: ChatResponse = self.post(Endpoint::Chat, &request).await?;

        Ok(GenerationResult {
            text: response.message.content,
            model_id: config.model_id.clone(),
        })
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.config.embed_model,
            input: texts,
        };

        debug!(model = %self.config.embed_model, inputs = texts.len(), "sending embed request");
        let response: EmbedResponse = self.post(Endpoint::Embed, &request).await?;

        validate_embeddings(response.embeddings, texts.len())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_documents(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::Embedding("Empty embedding response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let messages = vec![ChatMessage::system("Be brief."), ChatMessage::user("Hi")];
        let request = ChatRequest {
            model: "llama3.2",
            messages: &messages,
            stream: false,
            options: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "llama3.2",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hi"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn test_chat_options_skip_unset() {
        let options = ChatOptions {
            temperature: Some(0.0),
            num_predict: None,
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            serde_json::json!({"temperature": 0.0})
        );
    }

    #[test]
    fn test_chat_response_parse() {
        let body = r#"{
            "model": "llama3.2",
            "created_at": "2024-07-22T20:33:28.123648Z",
            "message": {"role": "assistant", "content": "Bananas are yellow."},
            "done_reason": "stop",
            "done": true
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.message.content, "Bananas are yellow.");
    }

    #[test]
    fn test_embed_response_parse() {
        let body = r#"{"model": "nomic-embed-text", "embeddings": [[0.1, 0.2], [0.3, 0.4]]}"#;
        let response: EmbedResponse = serde_json::from_str(body).unwrap();
        let embeddings = validate_embeddings(response.embeddings, 2).unwrap();
        assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_embedding_count_mismatch() {
        let err = validate_embeddings(vec![vec![1.0]], 2).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_embedding_dimension_mismatch() {
        let err = validate_embeddings(vec![vec![1.0, 2.0], vec![1.0]], 2).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "model \"llama9\" not found, try pulling it first"}"#),
            "model \"llama9\" not found, try pulling it first"
        );
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn test_endpoint_urls() {
        let client = OllamaClient::new(OllamaConfig::new("llama3.2").unwrap()).unwrap();
        assert_eq!(
            client.url(Endpoint::Chat).unwrap().as_str(),
            "http://localhost:11434/api/chat"
        );
        assert_eq!(
            client.url(Endpoint::Embed).unwrap().as_str(),
            "http://localhost:11434/api/embed"
        );
    }

    #[tokio::test]
    async fn test_embed_nothing_skips_request() {
        let client = OllamaClient::new(OllamaConfig::new("llama3.2").unwrap()).unwrap();
        let embeddings = client.embed_documents(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
