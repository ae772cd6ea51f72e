use pipeline::PaceConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// Root for per-call result files and the shared verified list.
    pub output_dir: PathBuf,
    pub log_format: LogFormat,
    /// Pause between per-company lookups inside one request.
    pub company_pace: PaceConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            output_dir: PathBuf::from("results"),
            log_format: LogFormat::Text,
            company_pace: PaceConfig::default(),
        }
    }
}

impl ApiConfig {
    /// `API_BIND` wins over `PORT`; `RESULTS_DIR`, `LOG_FORMAT` and
    /// `API_PAUSE_MS` override the rest.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(bind) = lookup("API_BIND") {
            config.bind_addr = bind;
        } else if let Some(port) = lookup("PORT") {
            config.bind_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(dir) = lookup("RESULTS_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")) {
            config.log_format = LogFormat::Json;
        }
        if let Some(pause_ms) = lookup("API_PAUSE_MS").and_then(|v| v.parse().ok()) {
            config.company_pace = PaceConfig::Fixed { pause_ms };
        }

        config
    }
}
