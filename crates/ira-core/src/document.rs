//! Documents loaded from the knowledge base and the chunks cut from them

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of file a document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain UTF-8 text
    Text,
}

impl FileType {
    /// Get the metadata label for this file type
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Text => "text",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source metadata attached to every document and inherited by its chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Full path of the file the document was read from
    pub source: PathBuf,
    /// Base name of the source file
    pub filename: String,
    pub file_type: FileType,
}

/// A whole source file held in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a text document for the file at `source`
    pub fn text(source: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let source = source.into();
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source,
                filename,
                file_type: FileType::Text,
            },
        }
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A bounded window of a document's text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Character offset in the parent document where this chunk starts
    pub start_index: usize,
}

impl Chunk {
    /// Stable identifier used in logs, e.g. `apples.txt#800`
    pub fn id(&self) -> String {
        format!("{}#{}", self.metadata.filename, self.start_index)
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A chunk paired with its similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
