//! LangSmith configuration

use serde::Serialize;
use std::env;
use url::Url;
use ira_core::{Error, Result};

/// Configuration for the LangSmith prompt registry client
#[derive(Clone, Serialize)]
pub struct LangSmithConfig {
    /// API root, always ending in `/`
    pub endpoint: Url,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl LangSmithConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.smith.langchain.com";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = get("LANGSMITH_API_KEY").filter(|key| !key.trim().is_empty());

        let endpoint = get("LANGSMITH_ENDPOINT")
            .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            endpoint: parse_endpoint(&endpoint)?,
            api_key,
        })
    }

    /// Create configuration for the public endpoint with an explicit key
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: parse_endpoint(Self::DEFAULT_ENDPOINT)?,
            api_key,
        })
    }

    /// Use a self-hosted or regional endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }
}

impl std::fmt::Debug for LangSmithConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangSmithConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| Error::Configuration(format!("Invalid LangSmith endpoint '{}': {}", raw, e)))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_without_variables() {
        let config = LangSmithConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://api.smith.langchain.com/");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_lookup_reads_key_and_endpoint() {
        let config = LangSmithConfig::from_lookup(|key| match key {
            "LANGSMITH_API_KEY" => Some("lsv2_pt_key".to_string()),
            "LANGSMITH_ENDPOINT" => Some("http://127.0.0.1:1984/api/v1".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("lsv2_pt_key"));
        assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:1984/api/v1/");
    }

    #[test]
    fn test_lookup_ignores_blank_key() {
        let config = LangSmithConfig::from_lookup(|key| {
            (key == "LANGSMITH_API_KEY").then(|| "  ".to_string())
        })
        .unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_lookup_rejects_bad_endpoint() {
        let result = LangSmithConfig::from_lookup(|key| {
            (key == "LANGSMITH_ENDPOINT").then(|| "::not a url::".to_string())
        });
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_default_endpoint() {
        let config = LangSmithConfig::new(None).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://api.smith.langchain.com/");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = LangSmithConfig::new(Some("lsv2_pt_secret".to_string())).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("lsv2_pt_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_custom_endpoint() {
        let config = LangSmithConfig::new(None)
            .unwrap()
            .with_endpoint("https://eu.api.smith.langchain.com")
            .unwrap();
        assert_eq!(config.endpoint.as_str(), "https://eu.api.smith.langchain.com/");
    }
}
