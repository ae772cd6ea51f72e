use std::sync::Arc;

use agents::{AgentConfig, WebExtractor};
use anyhow::{Context, Result};
use api::config::{ApiConfig, LogFormat};
use api::metrics::Metrics;
use api::{AppState, router};
use pipeline::StageExecutor;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ApiConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let agent_config = AgentConfig::from_env()?;
    let extractor = WebExtractor::new(&agent_config).context("Failed to build web extractor")?;
    let cache = extractor.cache().cloned();

    let state = AppState {
        executor: StageExecutor::new(Arc::new(extractor), 5, config.company_pace),
        output_dir: config.output_dir.clone(),
        metrics: Metrics::new(),
        cache,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
