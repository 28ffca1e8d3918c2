//! Overlapping, boundary-aware text chunking
//!
//! Documents are cut into windows of at most `chunk_size` characters. Each
//! window ends at the largest natural boundary available inside it
//! (paragraph, then line, then sentence, then word) and the next window
//! starts exactly `chunk_overlap` characters before that end. Lengths and
//! offsets are counted in characters, never bytes.

use tracing::debug;

use ira_core::{Chunk, Document, IndexingConfig, Result};

/// Separators tried from the coarsest to the finest unit
const SEPARATOR_LEVELS: &[&[&str]] = &[&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// Splits documents into overlapping chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        let config = IndexingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

impl RecursiveChunker {
    /// Create a chunker, clamping the overlap below the chunk size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Create a chunker from a validated indexing configuration
    pub fn from_config(config: &IndexingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.chunk_size, config.chunk_overlap))
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into `(start_char, piece)` pairs.
    ///
    /// Empty text yields no pieces. Text no longer than `chunk_size` yields
    /// a single piece.
    pub fn split_text(&self, text: &str) -> Vec<(usize, String)> {
        // Byte offset of every char, plus the end of the text.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut pieces = Vec::new();
        if total == 0 {
            return pieces;
        }

        let mut start = 0;
        loop {
            if total - start <= self.chunk_size {
                pieces.push((start, text[offsets[start]..].to_string()));
                break;
            }

            let end = self.window_end(text, &offsets, start);
            pieces.push((start, text[offsets[start]..offsets[end]].to_string()));
            start = end - self.chunk_overlap;
        }

        pieces
    }

    /// Pick where the window starting at `start` ends.
    ///
    /// The end always lies in `(start + overlap, start + chunk_size]`, so
    /// every window makes progress and none exceeds the size limit.
    fn window_end(&self, text: &str, offsets: &[usize], start: usize) -> usize {
        let lo = start + self.chunk_overlap;
        let hi = start + self.chunk_size;
        let window = &text[offsets[start]..offsets[hi]];

        for level in SEPARATOR_LEVELS {
            let cut = level
                .iter()
                .filter_map(|sep| window.rfind(sep).map(|pos| pos + sep.len()))
                .max();

            if let Some(byte_end) = cut {
                let target = offsets[start] + byte_end;
                let end = offsets.binary_search(&target).unwrap_or_else(|i| i);
                if end > lo {
                    return end;
                }
            }
        }

        hi
    }

    /// Split one document, copying its metadata onto every chunk
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.content)
            .into_iter()
            .map(|(start_index, content)| Chunk {
                content,
                metadata: document.metadata.clone(),
                start_index,
            })
            .collect()
    }

    /// Split documents in order
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|document| {
                let chunks = self.split_document(document);
                debug!(
                    source = %document.metadata.source.display(),
                    chunks = chunks.len(),
                    "split document"
                );
                chunks
            })
            .collect()
    }
}
