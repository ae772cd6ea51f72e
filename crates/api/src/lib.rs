//! HTTP surface over the individual pipeline stages.

pub mod config;
pub mod error;
pub mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agents::{
    ResearchResult, ResearchedCompany, SearchCache, ValidatedCompany, ValidationResult,
    VerifiedCompany, WebsiteResult,
};
use anyhow::Context;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use pipeline::{StageExecutor, consolidated, filters};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::metrics::{Endpoint, Metrics, TimedOperation};

pub use config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub executor: StageExecutor,
    pub output_dir: PathBuf,
    pub metrics: Arc<Metrics>,
    pub cache: Option<SearchCache>,
}

impl AppState {
    fn api_results_dir(&self) -> PathBuf {
        self.output_dir.join("api")
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/research", post(research))
        .route("/api/validate", post(validate))
        .route("/api/websites", post(websites))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub tech_area: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub tech_area: String,
    pub companies: Vec<ResearchedCompany>,
    #[serde(default)]
    pub query_used: String,
}

#[derive(Debug, Deserialize)]
pub struct WebsitesRequest {
    pub tech_area: String,
    pub validated_companies: Vec<ValidatedCompany>,
}

#[derive(Debug, Serialize)]
pub struct WebsitesResponse {
    #[serde(flatten)]
    pub result: WebsiteResult,
    pub high_confidence_websites: Vec<VerifiedCompany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

async fn research(
    State(state): State<AppState>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResult>, ApiError> {
    observed(&state.metrics, Endpoint::Research, run_research(&state, payload)).await
}

async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    observed(&state.metrics, Endpoint::Validate, run_validate(&state, payload)).await
}

async fn websites(
    State(state): State<AppState>,
    payload: Result<Json<WebsitesRequest>, JsonRejection>,
) -> Result<Json<WebsitesResponse>, ApiError> {
    observed(&state.metrics, Endpoint::Websites, run_websites(&state, payload)).await
}

async fn observed<T>(
    metrics: &Metrics,
    endpoint: Endpoint,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let timer = TimedOperation::start();
    let outcome = call.await;
    metrics.record(endpoint, timer.elapsed(), outcome.is_ok());
    outcome
}

async fn run_research(
    state: &AppState,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResult>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .executor
        .with_max_results(req.max_results)
        .research(&req.tech_area)
        .await
        .result;
    save_call_result(&state.api_results_dir(), "research", &req.tech_area, &result).await?;
    Ok(Json(result))
}

async fn run_validate(
    state: &AppState,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let Json(req) = payload?;
    let research = ResearchResult {
        tech_area: req.tech_area.clone(),
        companies: req.companies,
        summary: String::new(),
        query_used: req.query_used,
    };
    let result = state.executor.validate(&research).await.result;
    save_call_result(&state.api_results_dir(), "validation", &req.tech_area, &result).await?;
    Ok(Json(result))
}

/// Only companies with both flags set are searched. New high-confidence
/// entries are prepended to the shared verified list.
async fn run_websites(
    state: &AppState,
    payload: Result<Json<WebsitesRequest>, JsonRejection>,
) -> Result<Json<WebsitesResponse>, ApiError> {
    let Json(req) = payload?;
    let validation = ValidationResult {
        tech_area: req.tech_area.clone(),
        validated_companies: req.validated_companies,
        summary: String::new(),
        original_query: String::new(),
    };

    if filters::forwarded_companies(&validation).is_empty() {
        return Ok(Json(WebsitesResponse {
            result: WebsiteResult {
                tech_area: req.tech_area,
                company_websites: Vec::new(),
                count: 0,
            },
            high_confidence_websites: Vec::new(),
            message: Some("No valid Indian startups found to search for websites.".to_string()),
        }));
    }

    let result = state.executor.find_websites(&validation).await.result;
    let response = WebsitesResponse {
        high_confidence_websites: filters::verified_in(&result),
        result,
        message: None,
    };

    save_call_result(&state.api_results_dir(), "website", &req.tech_area, &response).await?;
    consolidated::prepend_shared(&state.output_dir, &response.high_confidence_websites)?;
    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "api_version": "1.0",
        "agents": ["research", "validate", "websites"]
    }))
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "requests": state.metrics.snapshot(),
        "search_cache": state.cache.as_ref().map(|c| c.stats()),
    }))
}

/// `<dir>/<stage>_result_<Tech_Area>.json`
fn call_result_path(dir: &Path, stage: &str, tech_area: &str) -> PathBuf {
    dir.join(format!("{}_result_{}.json", stage, tech_area.replace(' ', "_")))
}

async fn save_call_result<T: Serialize>(
    dir: &Path,
    stage: &str,
    tech_area: &str,
    data: &T,
) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = call_result_path(dir, stage, tech_area);
    let json = serde_json::to_string_pretty(data)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(stage, tech_area, path = %path.display(), "Call result saved");
    Ok(())
}
