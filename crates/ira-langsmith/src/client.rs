//! LangSmith prompt hub client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use ira_core::{Error, PromptProvider, PromptTemplate, Result};

use crate::config::LangSmithConfig;
use crate::manifest::prompt_from_manifest;

/// A parsed `[owner/]repo[:commit]` prompt identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptIdentifier {
    pub owner: String,
    pub repo: String,
    pub commit: String,
}

impl PromptIdentifier {
    /// Owner used for prompts addressed without one
    pub const ANY_OWNER: &'static str = "-";
    pub const LATEST: &'static str = "latest";

    pub fn parse(identifier: &str) -> Result<Self> {
        let invalid = || Error::Configuration(format!("Invalid prompt identifier: '{}'", identifier));

        let identifier = identifier.trim();
        let (path, commit) = match identifier.split_once(':') {
            Some((path, commit)) if !commit.is_empty() => (path, commit),
            Some(_) => return Err(invalid()),
            None => (identifier, Self::LATEST),
        };

        let (owner, repo) = match path.split_once('/') {
            Some((owner, repo)) => (owner, repo),
            None => (Self::ANY_OWNER, path),
        };

        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            commit: commit.to_string(),
        })
    }

    /// API path relative to the endpoint root
    fn commit_path(&self) -> String {
        format!("commits/{}/{}/{}", self.owner, self.repo, self.commit)
    }
}

#[derive(Deserialize)]
struct CommitResponse {
    commit_hash: String,
    manifest: serde_json::Value,
}

/// Client for pulling prompts from the LangSmith hub
pub struct LangSmithClient {
    config: LangSmithConfig,
    client: Client,
}

impl LangSmithClient {
    /// Create a new client from configuration
    pub fn new(config: LangSmithConfig) -> Result<Self> {
        if config.api_key.is_none() {
            warn!("LANGSMITH_API_KEY is not set; only public prompts can be pulled");
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = LangSmithConfig::from_env()?;
        Self::new(config)
    }

    fn commit_url(&self, id: &PromptIdentifier) -> Result<Url> {
        self.config
            .endpoint
            .join(&id.commit_path())
            .map_err(|e| Error::Configuration(format!("Invalid LangSmith URL: {}", e)))
    }
}

#[async_trait]
impl PromptProvider for LangSmithClient {
    async fn get_prompt(&self, identifier: &str) -> Result<PromptTemplate> {
        let id = PromptIdentifier::parse(identifier)?;
        let url = self.commit_url(&id)?;

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(ref api_key) = self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("LangSmith is unreachable: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::PromptRegistry(format!("Prompt '{}' not found", identifier)));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::PromptRegistry(format!(
                "LangSmith request failed with status {}: {}",
                status, error_text
            )));
        }

        let commit: CommitResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        info!(prompt = identifier, commit = %commit.commit_hash, "pulled prompt from registry");

        prompt_from_manifest(&commit.manifest)
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Answer a single request on a loopback port with a canned reply.
    /// The handle yields the raw request head that was received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_head(&mut stream);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
            request
        });

        (url, handle)
    }

    // GET requests carry no body, so the head is the whole request
    fn read_head(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(url: &str, api_key: Option<&str>) -> LangSmithClient {
        let config = LangSmithConfig::new(api_key.map(str::to_string))
            .unwrap()
            .with_endpoint(url)
            .unwrap();
        LangSmithClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_pull_prompt() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"commit_hash":"50442af1","manifest":{"id":["PromptTemplate"],"kwargs":{"template":"Context: {context}\nQuestion: {question}"}},"examples":[]}"#,
        );
        let client = client_for(&url, Some("ls-test-key"));

        let prompt = client.get_prompt("rlm/rag-prompt").await.unwrap();
        assert_eq!(prompt.input_variables(), vec!["context", "question"]);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /commits/rlm/rag-prompt/latest "), "{}", request);
        assert!(request.to_ascii_lowercase().contains("x-api-key: ls-test-key"));
    }

    #[tokio::test]
    async fn test_missing_prompt_is_not_found() {
        let (url, server) = serve_once("404 Not Found", r#"{"detail":"Not Found"}"#);
        let client = client_for(&url, None);

        let err = client.get_prompt("rlm/no-such-prompt").await.unwrap_err();
        let request = server.join().unwrap();

        assert!(!request.to_ascii_lowercase().contains("x-api-key"));
        match err {
            Error::PromptRegistry(message) => {
                assert_eq!(message, "Prompt 'rlm/no-such-prompt' not found")
            }
            other => panic!("expected PromptRegistry error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"detail":"database is down"}"#);
        let client = client_for(&url, None);

        let err = client.get_prompt("rlm/rag-prompt").await.unwrap_err();
        server.join().unwrap();

        match err {
            Error::PromptRegistry(message) => {
                assert!(message.contains("500"), "{}", message);
                assert!(message.contains("database is down"), "{}", message);
            }
            other => panic!("expected PromptRegistry error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client_for(&url, None).get_prompt("rlm/rag-prompt").await.unwrap_err();
        assert!(matches!(err, Error::Network(ref m) if m.starts_with("LangSmith is unreachable")), "{:?}", err);
    }
}
