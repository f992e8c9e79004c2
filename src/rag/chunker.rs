use crate::types::{AppError, Result};
use text_splitter::{ChunkConfig, TextSplitter};

/// Splits documents into overlapping character-bounded chunks on semantic
/// boundaries (paragraphs, sentences, words).
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Configuration(format!("Invalid chunk settings: {}", e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter
            .chunks(text)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect()
    }
}
