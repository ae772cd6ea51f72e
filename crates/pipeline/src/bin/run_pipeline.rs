//! Pipeline driver.
//!
//! ```bash
//! # All three stages for the default areas
//! cargo run --bin run_pipeline --release
//!
//! # Only find websites, reusing stages 1-2 of an earlier run
//! cargo run --bin run_pipeline -- -a 3 -s --resume-run run_20250314_092653
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use agents::{AgentConfig, WebExtractor};
use anyhow::{Context, Result};
use clap::Parser;
use pipeline::{
    DEFAULT_TECH_AREAS, Orchestrator, PaceConfig, PipelineConfig, RunOutcome, Stage,
    TECHNOLOGY_AREAS,
};
use store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "run_pipeline")]
#[command(about = "Research, validate and find websites for Indian startups", long_about = None)]
struct Cli {
    /// Technology areas to research
    #[arg(short, long, num_args = 1..)]
    tech_areas: Option<Vec<String>>,

    /// Research every standard technology area
    #[arg(long, conflicts_with = "tech_areas")]
    all_areas: bool,

    /// Maximum search results per query
    #[arg(short, long, default_value = "5")]
    max_results: usize,

    /// Stage to start from (1=research, 2=validate, 3=websites)
    #[arg(short = 'a', long = "stage", default_value = "1", value_parser = clap::value_parser!(u8).range(1..=3))]
    stage: u8,

    /// Run only the starting stage
    #[arg(short = 's', long)]
    run_single: bool,

    /// Directory for run outputs
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// Earlier run whose checkpoints feed the skipped stages
    #[arg(long)]
    resume_run: Option<String>,

    /// SQLite database for verified companies
    #[arg(long)]
    database: Option<PathBuf>,

    /// JSON file of company names to treat as already known
    #[arg(long, requires = "database")]
    known_names: Option<PathBuf>,

    /// Pause between categories and between website lookups
    #[arg(long, default_value = "2000")]
    pause_ms: u64,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let tech_areas = if self.all_areas {
            TECHNOLOGY_AREAS.iter().map(|s| s.to_string()).collect()
        } else {
            self.tech_areas
                .unwrap_or_else(|| DEFAULT_TECH_AREAS.iter().map(|s| s.to_string()).collect())
        };

        Ok(PipelineConfig {
            tech_areas,
            max_results_per_search: self.max_results,
            start_from: Stage::try_from(self.stage)?,
            run_all_stages: !self.run_single,
            output_dir: self.output_dir,
            resume_run: self.resume_run,
            pacing: PaceConfig::Fixed {
                pause_ms: self.pause_ms,
            },
            database_path: self.database,
            known_names_path: self.known_names,
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config()?;

    let agent_config = AgentConfig::from_env()?;
    let extractor = WebExtractor::new(&agent_config).context("Failed to build web extractor")?;

    let store = match &config.database_path {
        Some(path) => Some(
            SqliteStore::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))?,
        ),
        None => None,
    };

    let mut orchestrator = Orchestrator::new(config, Arc::new(extractor));
    if let Some(store) = store {
        orchestrator = orchestrator.with_store(Arc::new(store));
    }

    match orchestrator.run().await? {
        RunOutcome::Complete {
            report,
            report_path,
        } => {
            println!("\n=== PIPELINE SUMMARY ===");
            println!("Run:                  {}", report.run_id);
            println!("Companies researched: {}", report.summary.companies_researched);
            println!("Companies validated:  {}", report.summary.companies_validated);
            println!("Websites found:       {}", report.summary.websites_found);
            println!("Verified websites:    {}", report.summary.verified_websites);
            println!("Companies persisted:  {}", report.summary.companies_persisted);
            println!("Report:               {}", report_path.display());
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::StoppedAfter {
            stage,
            checkpoint_path,
            ..
        } => {
            println!("Stage {} ({}) results: {}", stage.index(), stage, checkpoint_path.display());
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Aborted { stage, path } => {
            eprintln!(
                "Cannot skip stage {} ({}): {} not found",
                stage.index(),
                stage,
                path.display()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
