use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub chat: ChatConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    /// How many times a non-JSON model reply is sent back for repair.
    pub json_repair_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: String::new(),
                request_timeout_secs: 120,
            },
            search: SearchConfig {
                base_url: "https://api.tavily.com".to_string(),
                api_key: String::new(),
                request_timeout_secs: 60,
            },
            cache: CacheConfig {
                enabled: true,
                max_entries: 1000,
            },
            json_repair_attempts: 2,
        }
    }
}

impl AgentConfig {
    /// Build from `OPENAI_*` / `TAVILY_*` variables; both API keys are required.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.chat.api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        config.search.api_key =
            std::env::var("TAVILY_API_KEY").context("TAVILY_API_KEY is not set")?;

        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.chat.base_url = url;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.chat.model = model;
        }
        if let Ok(url) = std::env::var("TAVILY_BASE_URL") {
            config.search.base_url = url;
        }

        Ok(config)
    }
}
