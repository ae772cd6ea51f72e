use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{SearchConfig, SearchDepth};

/// Client for a Tavily-compatible web search API.
#[derive(Clone)]
pub struct SearchClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Serialize)]
struct ContextEntry<'a> {
    url: &'a str,
    content: &'a str,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build search HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        depth: SearchDepth,
    ) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);

        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            search_depth: depth.as_str(),
            include_answer: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to search API")?;

        if !response.status().is_success() {
            anyhow::bail!("Search request failed: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse search response")
    }

    /// Search and render the hits as a compact JSON context for the model.
    pub async fn search_context(
        &self,
        query: &str,
        max_results: usize,
        depth: SearchDepth,
    ) -> Result<String> {
        let response = self.search(query, max_results, depth).await?;
        render_context(&response.results)
    }
}

pub fn render_context(hits: &[SearchHit]) -> Result<String> {
    let entries: Vec<ContextEntry<'_>> = hits
        .iter()
        .map(|hit| ContextEntry {
            url: &hit.url,
            content: &hit.content,
        })
        .collect();
    serde_json::to_string(&entries).context("Failed to render search context")
}
