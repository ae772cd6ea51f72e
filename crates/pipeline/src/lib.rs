//! Three-stage research pipeline: research → validate → find website, with a
//! JSON checkpoint per stage and resumable runs.

pub mod category_map;
pub mod checkpoint;
pub mod config;
pub mod consolidated;
pub mod error;
pub mod executor;
pub mod filters;
pub mod orchestrator;
pub mod pacing;
pub mod report;
pub mod run;
pub mod stage;

pub use category_map::CategoryMap;
pub use checkpoint::CheckpointWriter;
pub use config::{DEFAULT_TECH_AREAS, PipelineConfig, TECHNOLOGY_AREAS, load_known_names};
pub use error::{PipelineError, Result};
pub use executor::{CategoryOutcome, StageExecutor};
pub use orchestrator::{Orchestrator, RunOutcome, StageResults};
pub use pacing::{Backoff, FixedPause, NoPause, PaceConfig, PacePolicy};
pub use report::{PipelineReport, ReportSummary};
pub use run::Run;
pub use stage::Stage;
