use crate::crag::DocumentStore;
use crate::rag::chunker::TextChunker;
use crate::rag::search::Bm25Index;
use crate::types::{AppError, Passage, Result};
use crate::utils::toml_config::StoreConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

const CORPUS_EXTENSIONS: &[&str] = &["txt", "md"];

/// Document store over a local corpus, indexed once at start-up and ranked
/// with BM25.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    index: Bm25Index,
    /// Chunk id -> chunk text
    chunks: HashMap<String, String>,
    top_k: usize,
}

impl InMemoryDocumentStore {
    pub fn new(top_k: usize) -> Self {
        Self {
            index: Bm25Index::new(),
            chunks: HashMap::new(),
            top_k,
        }
    }

    /// Load and chunk every `.txt` / `.md` file in `config.corpus_dir`.
    ///
    /// A missing directory yields an empty store, so every question takes the
    /// corrective path.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
        let mut store = Self::new(config.top_k);

        let dir = config.corpus_dir.as_path();
        if !dir.is_dir() {
            warn!(corpus_dir = %dir.display(), "Corpus directory not found, document store is empty");
            return Ok(store);
        }

        let mut files = corpus_files(dir)?;
        files.sort();

        for path in &files {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AppError::Store(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            store.add_document(&name, &text, &chunker);
        }

        if store.is_empty() {
            warn!(corpus_dir = %dir.display(), files = files.len(), "Corpus has no indexable text, document store is empty");
        } else {
            info!(
                corpus_dir = %dir.display(),
                files = files.len(),
                chunks = store.len(),
                "Document store loaded"
            );
        }
        Ok(store)
    }

    /// Chunk `text` and index each chunk as `{name}#{n}`.
    pub fn add_document(&mut self, name: &str, text: &str, chunker: &TextChunker) {
        for (n, chunk) in chunker.chunk(text).into_iter().enumerate() {
            let id = format!("{}#{}", name, n);
            self.index.add_document(&id, &chunk);
            self.chunks.insert(id, chunk);
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn corpus_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AppError::Store(format!("Failed to list {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| AppError::Store(format!("Failed to list {}: {}", dir.display(), e)))?
            .path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CORPUS_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if path.is_file() && supported {
            files.push(path);
        }
    }
    Ok(files)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn retrieve(&self, question: &str) -> Result<Vec<Passage>> {
        let passages = self
            .index
            .search(question, self.top_k)
            .into_iter()
            .filter_map(|(id, _score)| {
                let content = self.chunks.get(&id)?.clone();
                Some(Passage::indexed(content).with_reference(id))
            })
            .collect();
        Ok(passages)
    }
}
