use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::stage::Stage;

/// One execution of the pipeline and its output directory.
#[derive(Debug, Clone)]
pub struct Run {
    run_id: String,
    timestamp: String,
    tech_areas: Vec<String>,
    run_dir: PathBuf,
    completed: BTreeSet<Stage>,
}

impl Run {
    /// Create `output_dir/run_<YYYYMMDD_HHMMSS>`. If a run directory with that
    /// timestamp already exists a numeric suffix keeps the id unique.
    pub fn create(output_dir: &Path, tech_areas: Vec<String>, now: DateTime<Local>) -> Result<Self> {
        std::fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

        let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
        let mut run_id = format!("run_{}", timestamp);
        let mut suffix = 0;

        let run_dir = loop {
            let candidate = output_dir.join(&run_id);
            match std::fs::create_dir(&candidate) {
                Ok(()) => break candidate,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    suffix += 1;
                    run_id = format!("run_{}_{}", timestamp, suffix);
                }
                Err(e) => return Err(PipelineError::io(candidate, e)),
            }
        };

        info!(run_id = %run_id, run_dir = %run_dir.display(), "Created run directory");

        Ok(Self {
            run_id,
            timestamp,
            tech_areas,
            run_dir,
            completed: BTreeSet::new(),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn tech_areas(&self) -> &[String] {
        &self.tech_areas
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn mark_completed(&mut self, stage: Stage) {
        self.completed.insert(stage);
    }

    pub fn is_completed(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }
}
