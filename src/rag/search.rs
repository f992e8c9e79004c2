//! BM25 lexical ranking over indexed chunks.

use std::collections::{HashMap, HashSet};

/// BM25 search index for lexical matching
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    /// Document ID -> tokenized content
    documents: HashMap<String, Vec<String>>,
    /// Term -> document IDs containing term
    inverted_index: HashMap<String, HashSet<String>>,
    /// Document frequencies for each term
    document_frequencies: HashMap<String, usize>,
    /// Sum of all document lengths, for the average
    total_tokens: usize,
    /// BM25 k1 parameter (term frequency saturation)
    k1: f32,
    /// BM25 b parameter (length normalization)
    b: f32,
}

impl Bm25Index {
    /// Create a new BM25 index with default parameters
    pub fn new() -> Self {
        Self::with_params(1.2, 0.75)
    }

    /// Create with custom BM25 parameters
    pub fn with_params(k1: f32, b: f32) -> Self {
        Self {
            k1,
            b,
            ..Default::default()
        }
    }

    /// Tokenize text into lowercase terms
    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() > 1)
            .map(String::from)
            .collect()
    }

    /// Add a document to the index. Ids must be unique.
    pub fn add_document(&mut self, id: &str, content: &str) {
        let tokens = Self::tokenize(content);

        let unique_terms: HashSet<_> = tokens.iter().cloned().collect();
        for term in unique_terms {
            *self.document_frequencies.entry(term.clone()).or_insert(0) += 1;
            self.inverted_index
                .entry(term)
                .or_default()
                .insert(id.to_string());
        }

        self.total_tokens += tokens.len();
        self.documents.insert(id.to_string(), tokens);
    }

    fn avg_doc_length(&self) -> f32 {
        if self.documents.is_empty() {
            return 0.0;
        }
        self.total_tokens as f32 / self.documents.len() as f32
    }

    /// Calculate IDF (Inverse Document Frequency) for a term
    fn idf(&self, term: &str) -> f32 {
        let df = self.document_frequencies.get(term).copied().unwrap_or(0) as f32;
        let n = self.documents.len() as f32;
        if df == 0.0 || n == 0.0 {
            return 0.0;
        }
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Calculate BM25 score for a document given a query
    fn score_document(&self, doc_id: &str, query_terms: &[String]) -> f32 {
        let Some(doc_tokens) = self.documents.get(doc_id) else {
            return 0.0;
        };

        let doc_len = doc_tokens.len() as f32;
        let avg_len = self.avg_doc_length().max(1.0);

        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for token in doc_tokens {
            *term_freq.entry(token.as_str()).or_insert(0) += 1;
        }

        query_terms
            .iter()
            .map(|term| {
                let tf = term_freq.get(term.as_str()).copied().unwrap_or(0) as f32;
                let numerator = tf * (self.k1 + 1.0);
                let denominator = tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_len);
                self.idf(term) * numerator / denominator
            })
            .sum()
    }

    /// Search the index and return up to `top_k` ids with a positive score,
    /// best first. Ties are broken by id so results are stable.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(String, f32)> {
        let query_terms = Self::tokenize(query);
        if query_terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut candidates: HashSet<&String> = HashSet::new();
        for term in &query_terms {
            if let Some(docs) = self.inverted_index.get(term) {
                candidates.extend(docs.iter());
            }
        }

        let mut results: Vec<(String, f32)> = candidates
            .into_iter()
            .map(|id| (id.clone(), self.score_document(id, &query_terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        results.truncate(top_k);
        results
    }
}
