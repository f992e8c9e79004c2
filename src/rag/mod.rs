//! Local document retrieval
//!
//! - [`chunker`] - splits corpus files into overlapping chunks
//! - [`search`] - BM25 ranking
//! - [`store`] - the [`DocumentStore`](crate::crag::DocumentStore) built from both

pub mod chunker;
pub mod search;
pub mod store;

pub use store::InMemoryDocumentStore;
