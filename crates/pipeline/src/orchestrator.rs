use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agents::{ResearchResult, SearchAndExtract, ValidationResult, VerifiedCompany, WebsiteResult};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde::de::DeserializeOwned;
use store::{CompanyRecord, DedupStore};
use tracing::{error, info, warn};

use crate::category_map::CategoryMap;
use crate::checkpoint::{CheckpointWriter, write_json};
use crate::config::{PipelineConfig, load_known_names};
use crate::consolidated;
use crate::error::Result;
use crate::executor::StageExecutor;
use crate::filters;
use crate::pacing::{self, PaceConfig, PacePolicy};
use crate::report::{PipelineReport, REPORT_FILE, ReportSummary};
use crate::run::Run;
use crate::stage::Stage;

/// Per-stage results gathered so far, executed or loaded.
#[derive(Debug, Clone, Default)]
pub struct StageResults {
    pub research: Option<CategoryMap<ResearchResult>>,
    pub validation: Option<CategoryMap<ValidationResult>>,
    pub websites: Option<CategoryMap<WebsiteResult>>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Complete {
        report: Box<PipelineReport>,
        report_path: PathBuf,
    },
    /// Single-stage mode: the starting stage finished and nothing else ran.
    StoppedAfter {
        stage: Stage,
        checkpoint_path: PathBuf,
        results: StageResults,
    },
    /// A checkpoint needed to skip `stage` was not at `path`.
    Aborted { stage: Stage, path: PathBuf },
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }
}

enum Loaded<T> {
    Found { data: T, path: PathBuf },
    Missing(PathBuf),
}

/// Sequences the three stages of a run: executes each stage from
/// `start_from` on and loads the checkpoints of the stages before it.
pub struct Orchestrator {
    config: PipelineConfig,
    executor: StageExecutor,
    pacer: Box<dyn PacePolicy>,
    store: Option<Arc<dyn DedupStore>>,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig, extractor: Arc<dyn SearchAndExtract>) -> Self {
        let executor = StageExecutor::new(extractor, config.max_results_per_search, config.pacing);
        let pacer = config.pacing.build();
        Self {
            config,
            executor,
            pacer,
            store: None,
        }
    }

    /// Replace the pacing used both between categories and between
    /// per-company lookups.
    pub fn with_pacing(mut self, pacing: PaceConfig) -> Self {
        self.config.pacing = pacing;
        self.pacer = pacing.build();
        self.executor = self.executor.with_company_pace(pacing);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn DedupStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.run_at(Local::now()).await
    }

    /// Run with an explicit start time, which names the run directory.
    pub async fn run_at(&mut self, now: DateTime<Local>) -> Result<RunOutcome> {
        let known_names = self.known_names()?;
        let mut run = Run::create(&self.config.output_dir, self.config.tech_areas.clone(), now)?;
        let start = self.config.start_from;

        let source_dir = match &self.config.resume_run {
            Some(id) => self.config.output_dir.join(id),
            None => run.run_dir().to_path_buf(),
        };

        info!(
            run_id = %run.run_id(),
            tech_areas = ?run.tech_areas(),
            start_from = start.index(),
            run_all_stages = self.config.run_all_stages,
            "===== STARTING PIPELINE RUN ====="
        );

        let mut results = StageResults::default();
        let mut filepaths: BTreeMap<String, PathBuf> = BTreeMap::new();

        // Stage 1
        let research = if start <= Stage::Research {
            banner(Stage::Research);
            let data = self.research_all(run.tech_areas()).await;
            let path = CheckpointWriter::save(Stage::Research, run.run_dir(), &data)?;
            run.mark_completed(Stage::Research);
            if self.stops_after(Stage::Research) {
                results.research = Some(data);
                return Ok(stopped(Stage::Research, path, results));
            }
            filepaths.insert(Stage::Research.name().to_string(), path);
            data
        } else {
            match load_into_run(Stage::Research, &source_dir, &mut run)? {
                Loaded::Found { data, path } => {
                    filepaths.insert(Stage::Research.name().to_string(), path);
                    data
                }
                Loaded::Missing(path) => return Ok(aborted(Stage::Research, path)),
            }
        };

        // Stage 2
        let validation = if start <= Stage::Validate {
            banner(Stage::Validate);
            let data = self.validate_all(&research).await;
            let path = CheckpointWriter::save(Stage::Validate, run.run_dir(), &data)?;
            run.mark_completed(Stage::Validate);
            if self.stops_after(Stage::Validate) {
                results.research = Some(research);
                results.validation = Some(data);
                return Ok(stopped(Stage::Validate, path, results));
            }
            filepaths.insert(Stage::Validate.name().to_string(), path);
            data
        } else {
            match load_into_run(Stage::Validate, &source_dir, &mut run)? {
                Loaded::Found { data, path } => {
                    filepaths.insert(Stage::Validate.name().to_string(), path);
                    data
                }
                Loaded::Missing(path) => return Ok(aborted(Stage::Validate, path)),
            }
        };

        // Stage 3 always executes: there is no later stage to resume from.
        banner(Stage::FindWebsite);
        let websites = self.find_websites_all(&validation).await;
        let websites_path = CheckpointWriter::save(Stage::FindWebsite, run.run_dir(), &websites)?;
        run.mark_completed(Stage::FindWebsite);

        let verified = filters::consolidate(&websites);
        let consolidated_path = consolidated::write_run_list(run.run_dir(), &verified)?;
        consolidated::prepend_shared(&self.config.output_dir, &verified)?;
        let persisted = self.persist(&verified, &known_names);

        if self.stops_after(Stage::FindWebsite) {
            results.research = Some(research);
            results.validation = Some(validation);
            results.websites = Some(websites);
            return Ok(stopped(Stage::FindWebsite, websites_path, results));
        }

        filepaths.insert(Stage::FindWebsite.name().to_string(), websites_path);
        filepaths.insert("consolidated".to_string(), consolidated_path);

        let mut summary = ReportSummary::compute(&research, &validation, &websites);
        summary.companies_persisted = persisted;

        let report = PipelineReport {
            run_id: run.run_id().to_string(),
            timestamp: run.timestamp().to_string(),
            tech_areas: run.tech_areas().to_vec(),
            summary,
            filepaths,
        };
        let report_path = run.run_dir().join(REPORT_FILE);
        write_json(&report_path, &report)?;

        info!(
            run_id = %report.run_id,
            companies_researched = report.summary.companies_researched,
            companies_validated = report.summary.companies_validated,
            websites_found = report.summary.websites_found,
            verified_websites = report.summary.verified_websites,
            companies_persisted = report.summary.companies_persisted,
            report = %report_path.display(),
            "===== PIPELINE COMPLETED SUCCESSFULLY ====="
        );

        Ok(RunOutcome::Complete {
            report: Box::new(report),
            report_path,
        })
    }

    fn stops_after(&self, stage: Stage) -> bool {
        !self.config.run_all_stages && self.config.start_from == stage
    }

    fn known_names(&self) -> Result<HashSet<String>> {
        match (&self.store, &self.config.known_names_path) {
            (Some(_), Some(path)) => {
                let names = load_known_names(path)?;
                info!(names = names.len(), path = %path.display(), "Loaded known company names");
                Ok(names)
            }
            _ => Ok(HashSet::new()),
        }
    }

    async fn research_all(&mut self, tech_areas: &[String]) -> CategoryMap<ResearchResult> {
        let mut out = CategoryMap::new();
        for (i, tech_area) in tech_areas.iter().enumerate() {
            let outcome = self.executor.research(tech_area).await;
            let succeeded = outcome.succeeded();
            out.insert(tech_area.clone(), outcome.result);
            if i + 1 < tech_areas.len() {
                pacing::pause(self.pacer.as_mut(), succeeded).await;
            }
        }
        out
    }

    async fn validate_all(
        &mut self,
        research: &CategoryMap<ResearchResult>,
    ) -> CategoryMap<ValidationResult> {
        let mut out = CategoryMap::new();
        for (i, (tech_area, result)) in research.iter().enumerate() {
            let outcome = self.executor.validate(result).await;
            let succeeded = outcome.succeeded();
            out.insert(tech_area, outcome.result);
            if i + 1 < research.len() {
                pacing::pause(self.pacer.as_mut(), succeeded).await;
            }
        }
        out
    }

    async fn find_websites_all(
        &mut self,
        validation: &CategoryMap<ValidationResult>,
    ) -> CategoryMap<WebsiteResult> {
        let mut out = CategoryMap::new();
        for (i, (tech_area, result)) in validation.iter().enumerate() {
            let outcome = self.executor.find_websites(result).await;
            let succeeded = outcome.succeeded();
            out.insert(tech_area, outcome.result);
            if i + 1 < validation.len() {
                pacing::pause(self.pacer.as_mut(), succeeded).await;
            }
        }
        out
    }

    /// Insert this run's verified companies. Returns the number of new rows.
    fn persist(&self, verified: &[VerifiedCompany], known_names: &HashSet<String>) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };

        let records: Vec<CompanyRecord> = verified
            .iter()
            .map(|v| CompanyRecord {
                name: v.name.clone(),
                website: v.website.clone(),
                tech_area: v.tech_area.clone(),
            })
            .collect();

        let outcome = store.insert_new(&records, known_names);
        match &outcome.error {
            Some(e) => error!(error = %e, "Persisting verified companies failed, batch rolled back"),
            None => info!(
                inserted = outcome.inserted.len(),
                skipped = outcome.skipped.len(),
                "Verified companies persisted"
            ),
        }
        outcome.inserted.len()
    }
}

/// Load a skipped stage's checkpoint from `source_dir` and copy it into the
/// run directory, so every path the run reports lies inside it.
fn load_into_run<T>(stage: Stage, source_dir: &Path, run: &mut Run) -> Result<Loaded<T>>
where
    T: Serialize + DeserializeOwned,
{
    info!(stage = %stage, "===== SKIPPING STAGE {}: LOADING PREVIOUS RESULTS =====", stage.index());
    let data: T = match CheckpointWriter::load(stage, source_dir) {
        Ok(data) => data,
        Err(e) if e.is_not_found() => {
            let path = CheckpointWriter::path_for(stage, source_dir);
            warn!(stage = %stage, path = %path.display(), "Previous results not found, aborting run");
            return Ok(Loaded::Missing(path));
        }
        Err(e) => return Err(e),
    };

    let path = CheckpointWriter::save(stage, run.run_dir(), &data)?;
    run.mark_completed(stage);
    Ok(Loaded::Found { data, path })
}

fn banner(stage: Stage) {
    info!(stage = %stage, "===== RUNNING STAGE {}: {} =====", stage.index(), stage.title());
}

fn stopped(stage: Stage, checkpoint_path: PathBuf, results: StageResults) -> RunOutcome {
    info!(
        stage = %stage,
        path = %checkpoint_path.display(),
        "===== SINGLE STAGE COMPLETED ====="
    );
    RunOutcome::StoppedAfter {
        stage,
        checkpoint_path,
        results,
    }
}

fn aborted(stage: Stage, path: PathBuf) -> RunOutcome {
    error!(stage = %stage, path = %path.display(), "===== PIPELINE ABORTED =====");
    RunOutcome::Aborted { stage, path }
}
