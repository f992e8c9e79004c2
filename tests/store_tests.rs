//! Corpus loading and retrieval from disk.

use crag::crag::DocumentStore;
use crag::rag::InMemoryDocumentStore;
use crag::types::PassageSource;
use crag::utils::toml_config::StoreConfig;
use std::fs;
use tempfile::TempDir;

fn store_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        corpus_dir: dir.path().to_path_buf(),
        chunk_size: 200,
        chunk_overlap: 20,
        top_k: 4,
    }
}

#[tokio::test]
async fn test_loads_txt_and_md_only() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("agents.md"), "# Agents\n\nLLM agents plan with memory.").unwrap();
    fs::write(dir.path().join("prompting.txt"), "Few-shot prompting gives examples.").unwrap();
    fs::write(dir.path().join("ignored.json"), r#"{"memory": "agents"}"#).unwrap();

    let store = InMemoryDocumentStore::from_config(&store_config(&dir)).unwrap();
    assert_eq!(store.len(), 2);

    let passages = store.retrieve("agents memory").await.unwrap();
    assert_eq!(passages.len(), 1);
    assert_eq!(passages[0].source, PassageSource::Indexed);
    assert_eq!(passages[0].reference.as_deref(), Some("agents.md#0"));
    assert!(passages[0].content.contains("plan with memory"));
}

#[tokio::test]
async fn test_long_document_is_chunked_and_capped_at_top_k() {
    let dir = TempDir::new().unwrap();
    let paragraph = "Agents keep memory of past tool calls and observations.\n\n";
    fs::write(dir.path().join("long.txt"), paragraph.repeat(40)).unwrap();

    let store = InMemoryDocumentStore::from_config(&store_config(&dir)).unwrap();
    assert!(store.len() > 4);

    let passages = store.retrieve("memory observations").await.unwrap();
    assert_eq!(passages.len(), 4);
    assert!(passages.iter().all(|p| p.content.chars().count() <= 200));
}

#[tokio::test]
async fn test_missing_corpus_dir_gives_empty_store() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig {
        corpus_dir: dir.path().join("does-not-exist"),
        ..store_config(&dir)
    };

    let store = InMemoryDocumentStore::from_config(&config).unwrap();
    assert!(store.is_empty());
    assert!(store.retrieve("anything").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unrelated_question_retrieves_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("agents.md"), "LLM agents plan with memory.").unwrap();

    let store = InMemoryDocumentStore::from_config(&store_config(&dir)).unwrap();
    assert!(store.retrieve("volcano eruptions").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_whitespace_only_corpus_gives_empty_store() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blank.md"), "  \n\n\t").unwrap();

    let store = InMemoryDocumentStore::from_config(&store_config(&dir)).unwrap();
    assert!(store.is_empty());
    assert!(store.retrieve("anything").await.unwrap().is_empty());
}
