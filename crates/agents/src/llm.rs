use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ChatConfig;
use crate::prompt;

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build chat HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to chat model")?;

        if !response.status().is_success() {
            anyhow::bail!("Chat request failed: {}", response.status());
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat response contained no message content")
    }

    /// Generate a JSON object that passes `validate`. Replies that are not
    /// JSON, or do not match the expected shape, are sent back for repair
    /// together with the parse error.
    pub async fn generate_json_with_retry(
        &self,
        system_prompt: &str,
        prompt: &str,
        repair_attempts: usize,
        validate: ShapeCheck,
    ) -> Result<serde_json::Value> {
        let mut reply = self.generate(system_prompt, prompt).await?;
        let mut last_error = String::new();

        for attempt in 0..=repair_attempts {
            match check_reply(&reply, validate) {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt, "Model reply repaired");
                    }
                    return Ok(value);
                }
                Err(problem) => {
                    last_error = problem.to_string();
                    if attempt == repair_attempts {
                        break;
                    }
                    warn!(attempt, error = %problem, "Model reply rejected, asking for repair");
                    reply = self
                        .generate(system_prompt, &problem.repair_prompt(&reply))
                        .await?;
                }
            }
        }

        anyhow::bail!(
            "Failed to get a valid reply after {} repair attempts: {}",
            repair_attempts,
            last_error
        )
    }
}

/// Checks that a parsed reply has the shape the caller expects.
pub type ShapeCheck = fn(&serde_json::Value) -> serde_json::Result<()>;

#[derive(Debug)]
enum ReplyProblem {
    InvalidJson(serde_json::Error),
    WrongShape(serde_json::Error),
}

impl ReplyProblem {
    fn repair_prompt(&self, reply: &str) -> String {
        match self {
            ReplyProblem::InvalidJson(_) => prompt::build_retry_prompt(reply),
            ReplyProblem::WrongShape(e) => prompt::build_schema_retry_prompt(reply, &e.to_string()),
        }
    }
}

impl std::fmt::Display for ReplyProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyProblem::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            ReplyProblem::WrongShape(e) => write!(f, "schema mismatch: {}", e),
        }
    }
}

fn check_reply(reply: &str, validate: ShapeCheck) -> std::result::Result<serde_json::Value, ReplyProblem> {
    let value: serde_json::Value =
        serde_json::from_str(strip_code_fence(reply)).map_err(ReplyProblem::InvalidJson)?;
    validate(&value).map_err(ReplyProblem::WrongShape)?;
    Ok(value)
}

/// Models sometimes wrap JSON in a markdown fence despite being told not to.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
