//! DuckDuckGo web search via daedra
//!
//! Needs no API key. The result description is used as the snippet.

use crate::crag::WebSearchProvider;
use crate::types::{AppError, Result, WebSnippet};
use async_trait::async_trait;

/// Web search powered by daedra
pub struct DuckDuckGoSearch {
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }
}

#[async_trait]
impl WebSearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<WebSnippet>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .take(self.max_results)
            .map(|r| WebSnippet {
                content: r.description.clone(),
                url: Some(r.url.clone()),
                title: Some(r.title.clone()),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}
