//! Ollama configuration

use serde::{Deserialize, Serialize};
use std::env;
use url::Url;
use ira_core::{Error, Result};

/// Configuration for the Ollama client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Server root, always ending in `/`
    pub base_url: Url,
    /// Model answering chat requests
    pub chat_model: String,
    /// Model producing embeddings
    pub embed_model: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl OllamaConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    pub const DEFAULT_EMBED_MODEL: &'static str = "nomic-embed-text";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any variable source, e.g. a map in tests
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let chat_model = get("OLLAMA_MODEL")
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| Error::Configuration(
                "OLLAMA_MODEL is not set in the environment variables".to_string()
            ))?;

        let base_url = get("OLLAMA_BASE_URL")
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let embed_model = get("OLLAMA_EMBED_MODEL")
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_EMBED_MODEL.to_string());

        let timeout_secs = match get("OLLAMA_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| Error::Configuration(
                format!("OLLAMA_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw)
            ))?),
            None => None,
        };

        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            chat_model,
            embed_model,
            timeout_secs,
        })
    }

    /// Create configuration for a local server with explicit chat model
    pub fn new(chat_model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(Self::DEFAULT_BASE_URL)?,
            chat_model: chat_model.into(),
            embed_model: Self::DEFAULT_EMBED_MODEL.to_string(),
            timeout_secs: None,
        })
    }

    /// Point the client at another server
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Use a different embedding model
    pub fn with_embed_model(mut self, embed_model: impl Into<String>) -> Self {
        self.embed_model = embed_model.into();
        self
    }
}

/// Parse a server root, adding the trailing slash `Url::join` relies on
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| Error::Configuration(format!("Invalid Ollama URL '{}': {}", raw, e)))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
