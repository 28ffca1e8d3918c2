//! Decoding of serialized LangChain prompt manifests
//!
//! The registry stores prompts as LangChain constructor objects:
//! `{"lc": 1, "type": "constructor", "id": [.., "ClassName"], "kwargs": {..}}`.
//! Only the prompt shapes a RAG prompt can take are supported.

use serde_json::Value;
use ira_core::{Error, MessageTemplate, PromptTemplate, Result, Role};

/// Convert a manifest into a prompt template
pub fn prompt_from_manifest(manifest: &Value) -> Result<PromptTemplate> {
    match class_name(manifest)? {
        "PromptTemplate" => PromptTemplate::from_template(string_template(manifest)?),
        "ChatPromptTemplate" => {
            let messages = kwargs(manifest)?
                .get("messages")
                .and_then(Value::as_array)
                .ok_or_else(|| unsupported("ChatPromptTemplate without messages"))?;

            let templates = messages
                .iter()
                .map(message_template)
                .collect::<Result<Vec<_>>>()?;

            PromptTemplate::new(templates)
        }
        // Prompts saved together with a model: the prompt is the first step.
        "RunnableSequence" => {
            let first = kwargs(manifest)?
                .get("first")
                .ok_or_else(|| unsupported("RunnableSequence without a first step"))?;
            prompt_from_manifest(first)
        }
        other => Err(unsupported(&format!("prompt type '{}'", other))),
    }
}

fn message_template(node: &Value) -> Result<MessageTemplate> {
    let class = class_name(node)?;

    let (role, template) = match class {
        "SystemMessagePromptTemplate" => (Role::System, wrapped_template(node)?),
        "HumanMessagePromptTemplate" => (Role::User, wrapped_template(node)?),
        "AIMessagePromptTemplate" => (Role::Assistant, wrapped_template(node)?),
        "SystemMessage" => (Role::System, escape_braces(literal_content(node)?)),
        "HumanMessage" => (Role::User, escape_braces(literal_content(node)?)),
        "AIMessage" => (Role::Assistant, escape_braces(literal_content(node)?)),
        other => return Err(unsupported(&format!("message type '{}'", other))),
    };

    Ok(MessageTemplate { role, template })
}

fn class_name(node: &Value) -> Result<&str> {
    node.get("id")
        .and_then(Value::as_array)
        .and_then(|id| id.last())
        .and_then(Value::as_str)
        .ok_or_else(|| unsupported("object without a class id"))
}

fn kwargs(node: &Value) -> Result<&Value> {
    node.get("kwargs")
        .ok_or_else(|| unsupported("object without kwargs"))
}

/// The template string of a `PromptTemplate` node
fn string_template(node: &Value) -> Result<String> {
    let kwargs = kwargs(node)?;

    if let Some(format) = kwargs.get("template_format").and_then(Value::as_str) {
        if format != "f-string" {
            return Err(unsupported(&format!("template format '{}'", format)));
        }
    }

    kwargs
        .get("template")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| unsupported("PromptTemplate without a template string"))
}

/// The template of a `*MessagePromptTemplate`, which wraps a `PromptTemplate`
fn wrapped_template(node: &Value) -> Result<String> {
    let prompt = kwargs(node)?
        .get("prompt")
        .ok_or_else(|| unsupported("message template without a prompt"))?;

    match class_name(prompt)? {
        "PromptTemplate" => string_template(prompt),
        other => Err(unsupported(&format!("message prompt type '{}'", other))),
    }
}

fn literal_content(node: &Value) -> Result<&str> {
    kwargs(node)?
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| unsupported("message without text content"))
}

fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

fn unsupported(what: &str) -> Error {
    Error::PromptRegistry(format!("Unsupported prompt manifest: {}", what))
}
