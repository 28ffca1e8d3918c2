//! Knowledge base directory loader

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use ira_core::{Document, Error, Result};

/// Documents read from the knowledge base, plus the files that could not be read
#[derive(Debug, Clone, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<Document>,
    pub skipped: Vec<PathBuf>,
}

/// Reads every `*.txt` file directly inside a directory
pub struct KnowledgeBaseLoader {
    directory: PathBuf,
}

impl KnowledgeBaseLoader {
    pub const DEFAULT_DIRECTORY: &'static str = "knowledge_base";
    pub const EXTENSION: &'static str = "txt";

    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Load all text files, in path order.
    ///
    /// Subdirectories are not searched. A file that cannot be read as UTF-8
    /// text is logged and skipped; the load fails only when the directory is
    /// missing or no document could be read at all.
    pub fn load(&self) -> Result<LoadedDocuments> {
        if !self.directory.is_dir() {
            return Err(Error::KnowledgeBaseNotFound(self.directory.clone()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if is_text_file(&path) {
                        paths.push(path);
                    }
                }
                Err(e) => warn!(
                    directory = %self.directory.display(),
                    error = %e,
                    "Error reading knowledge base entry"
                ),
            }
        }
        paths.sort();

        let mut loaded = LoadedDocuments::default();
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(path = %path.display(), chars = content.chars().count(), "loaded document");
                    loaded.documents.push(Document::text(path, content));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Error loading file, skipping");
                    loaded.skipped.push(path);
                }
            }
        }

        if loaded.documents.is_empty() {
            return Err(Error::EmptyKnowledgeBase(self.directory.clone()));
        }

        Ok(loaded)
    }
}

fn is_text_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext == KnowledgeBaseLoader::EXTENSION)
}
