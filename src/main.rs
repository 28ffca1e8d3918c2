use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use ira_cli::{display_banner, ChatSession};
use ira_core::{LLMProvider, PromptProvider, DEFAULT_TOP_K};
use ira_langsmith::LangSmithClient;
use ira_ollama::OllamaClient;
use ira_rag::{KnowledgeBaseIndexer, KnowledgeBaseLoader, RagPipeline};

mod logging;

/// Prompt pulled from the LangSmith hub unless `--prompt` says otherwise
const DEFAULT_PROMPT: &str = "rlm/rag-prompt";

#[derive(Parser, Debug)]
#[command(name = "ira")]
#[command(about = "Ask questions about a local knowledge base", long_about = None)]
struct Cli {
    /// Directory holding the *.txt documents to index
    #[arg(long, default_value = KnowledgeBaseLoader::DEFAULT_DIRECTORY)]
    knowledge_base: PathBuf,

    /// Prompt identifier on the LangSmith hub, `[owner/]repo[:commit]`
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K, value_parser = parse_top_k)]
    top_k: usize,

    /// Sampling temperature for answers; the model's default when unset
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum number of tokens per answer
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Answer a single question and exit
    #[arg(short, long)]
    question: Option<String>,
}

fn parse_top_k(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(k) => Ok(k),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let cli = Cli::parse();

    // Fail on a missing OLLAMA_MODEL before any network work
    let ollama = Arc::new(OllamaClient::from_env()?);

    let indexer = KnowledgeBaseIndexer::new(&cli.knowledge_base, ollama.clone());
    let (vector_store, stats) = indexer.index().await?;

    let prompt_hub = LangSmithClient::from_env()?;
    let prompt = prompt_hub.get_prompt(&cli.prompt).await?;

    let pipeline = RagPipeline::new(vector_store, prompt, ollama)?
        .with_top_k(cli.top_k)
        .with_temperature(cli.temperature)
        .with_max_tokens(cli.max_tokens);
    info!(prompt = %cli.prompt, top_k = pipeline.top_k(), "assistant ready");

    let mut stdout = io::stdout();
    if cli.question.is_none() {
        display_banner(&mut stdout, pipeline.llm().model_id(), &stats)?;
    }

    let mut session = ChatSession::new(io::stdin().lock(), stdout.lock());
    match cli.question {
        Some(question) => session.ask(&pipeline, &question).await?,
        None => session.run(&pipeline).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ira"]);

        assert_eq!(cli.knowledge_base, PathBuf::from("knowledge_base"));
        assert_eq!(cli.prompt, "rlm/rag-prompt");
        assert_eq!(cli.top_k, 4);
        assert!(cli.question.is_none());
        assert!(cli.temperature.is_none());
        assert!(cli.max_tokens.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "ira",
            "--knowledge-base",
            "docs",
            "--prompt",
            "me/qa:abc123",
            "--top-k",
            "2",
            "--temperature",
            "0.1",
            "--max-tokens",
            "256",
            "-q",
            "What color are bananas?",
        ]);

        assert_eq!(cli.knowledge_base, PathBuf::from("docs"));
        assert_eq!(cli.prompt, "me/qa:abc123");
        assert_eq!(cli.top_k, 2);
        assert_eq!(cli.temperature, Some(0.1));
        assert_eq!(cli.max_tokens, Some(256));
        assert_eq!(cli.question.as_deref(), Some("What color are bananas?"));
    }

    #[test]
    fn test_top_k_must_be_positive() {
        assert_snapshot!(parse_top_k("0").unwrap_err(), @"must be at least 1");
        assert!(parse_top_k("x").is_err());
        assert!(Cli::try_parse_from(["ira", "--top-k", "0"]).is_err());
    }
}
