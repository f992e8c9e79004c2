//! Tavily web search client
//!
//! `POST {api_base}/search` with the API key in the body; results carry a
//! `content` snippet per page.

use crate::crag::WebSearchProvider;
use crate::types::{AppError, Result, WebSnippet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: String,
}

/// Web search backed by the Tavily API
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    max_results: usize,
}

impl TavilySearch {
    pub fn new(api_key: String, api_base: String, max_results: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            max_results,
        }
    }
}

#[async_trait]
impl WebSearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<WebSnippet>> {
        let url = format!("{}/search", self.api_base);
        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Tavily request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Tavily returned HTTP {}: {}",
                status, error_body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid Tavily response: {}", e)))?;

        Ok(parsed
            .results
            .into_iter()
            .take(self.max_results)
            .map(|hit| WebSnippet {
                content: hit.content,
                url: hit.url,
                title: hit.title,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
