use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::SearchCache;
use crate::config::{AgentConfig, SearchDepth};
use crate::llm::{ChatClient, ShapeCheck};
use crate::prompt;
use crate::search::SearchClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Research,
    Validation,
    WebsiteFinder,
}

/// One search-then-extract call.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub agent: AgentKind,
    pub system_prompt: &'static str,
    pub query: String,
    pub max_results: usize,
    pub search_depth: SearchDepth,
    /// JSON shape the reply must follow.
    pub schema_hint: &'static str,
    /// Typed check of the reply; failures go back to the model for repair.
    pub validate: ShapeCheck,
}

/// The boundary between the pipeline and whatever LLM / search provider
/// does the work.
#[async_trait]
pub trait SearchAndExtract: Send + Sync {
    async fn search_and_extract(&self, request: &ExtractionRequest) -> Result<serde_json::Value>;
}

/// Production implementation: web search, then a JSON-mode chat completion.
pub struct WebExtractor {
    search: SearchClient,
    llm: ChatClient,
    cache: Option<SearchCache>,
    json_repair_attempts: usize,
}

impl WebExtractor {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let cache = config
            .cache
            .enabled
            .then(|| SearchCache::new(config.cache.max_entries));

        Ok(Self {
            search: SearchClient::new(&config.search)?,
            llm: ChatClient::new(&config.chat)?,
            cache,
            json_repair_attempts: config.json_repair_attempts,
        })
    }

    pub fn cache(&self) -> Option<&SearchCache> {
        self.cache.as_ref()
    }

    async fn context_for(&self, request: &ExtractionRequest) -> Result<String> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&request.query, request.max_results, request.search_depth)
            {
                debug!(query = %request.query, "Search context served from cache");
                return Ok(hit);
            }
        }

        let context = self
            .search
            .search_context(&request.query, request.max_results, request.search_depth)
            .await
            .with_context(|| format!("Search failed for query: {}", request.query))?;

        if let Some(cache) = &self.cache {
            cache.set(
                &request.query,
                request.max_results,
                request.search_depth,
                context.clone(),
            );
        }
        Ok(context)
    }
}

#[async_trait]
impl SearchAndExtract for WebExtractor {
    async fn search_and_extract(&self, request: &ExtractionRequest) -> Result<serde_json::Value> {
        debug!(agent = ?request.agent, query = %request.query, "Search query");

        let context = self.context_for(request).await?;
        let prompt = prompt::build_extraction_prompt(&request.query, &context, request.schema_hint);

        self.llm
            .generate_json_with_retry(
                request.system_prompt,
                &prompt,
                self.json_repair_attempts,
                request.validate,
            )
            .await
            .with_context(|| format!("Extraction failed for query: {}", request.query))
    }
}
