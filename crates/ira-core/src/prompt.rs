//! Prompt templates and the registry trait that supplies them
//!
//! Templates use f-string syntax: `{name}` is a placeholder and `{{` / `}}`
//! are literal braces. A template is an ordered list of message templates,
//! each rendered into one [`ChatMessage`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ChatMessage, Error, Result, Role};

/// One message of a prompt, before rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub role: Role,
    pub template: String,
}

/// A parameterized prompt rendered into chat messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    messages: Vec<MessageTemplate>,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

impl PromptTemplate {
    /// Build a prompt from message templates, checking every template parses
    pub fn new(messages: Vec<MessageTemplate>) -> Result<Self> {
        if messages.is_empty() {
            return Err(Error::Template("prompt has no messages".to_string()));
        }
        for message in &messages {
            parse_segments(&message.template)?;
        }
        Ok(Self { messages })
    }

    /// A prompt made of a single user message
    pub fn from_template(template: impl Into<String>) -> Result<Self> {
        Self::new(vec![MessageTemplate {
            role: Role::User,
            template: template.into(),
        }])
    }

    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }

    /// Placeholder names in first-seen order, without duplicates
    pub fn input_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for message in &self.messages {
            // Templates were validated in `new`, so parsing cannot fail here.
            for segment in parse_segments(&message.template).unwrap_or_default() {
                if let Segment::Variable(name) = segment {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }

    /// Substitute every placeholder and produce the chat messages
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<Vec<ChatMessage>> {
        self.messages
            .iter()
            .map(|message| {
                let mut content = String::with_capacity(message.template.len());
                for segment in parse_segments(&message.template)? {
                    match segment {
                        Segment::Literal(text) => content.push_str(&text),
                        Segment::Variable(name) => {
                            let value = values.get(name.as_str()).ok_or_else(|| {
                                Error::Template(format!("missing value for variable '{}'", name))
                            })?;
                            content.push_str(value);
                        }
                    }
                }
                Ok(ChatMessage::new(message.role, content))
            })
            .collect()
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(Error::Template(format!(
                                "nested '{{' in placeholder of template: {}",
                                template
                            )));
                        }
                        _ => name.push(inner),
                    }
                }
                if !closed {
                    return Err(Error::Template("unclosed '{' in template".to_string()));
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::Template("empty placeholder '{}' in template".to_string()));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(Error::Template("single '}' in template".to_string()));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Trait for registries that hand out prompt templates by name
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Fetch the template registered under `identifier`
    async fn get_prompt(&self, identifier: &str) -> Result<PromptTemplate>;
}
