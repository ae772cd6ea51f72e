mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agents::{AgentKind, SearchAndExtract};
use chrono::{DateTime, Local, TimeZone};
use common::{FakeExtractor, test_config, two_area_fixture};
use pipeline::consolidated::{VERIFIED_COMPANIES_FILE, read_list};
use pipeline::{CheckpointWriter, Orchestrator, PaceConfig, PipelineConfig, RunOutcome, Stage};
use store::{CompanyRecord, DedupStore, SqliteStore};
use tempfile::TempDir;

fn at(minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 3, 14, 9, minute, 0).unwrap()
}

fn orchestrator(config: PipelineConfig, fake: &Arc<FakeExtractor>) -> Orchestrator {
    let extractor: Arc<dyn SearchAndExtract> = fake.clone();
    Orchestrator::new(config, extractor)
}

fn has_report(output_dir: &Path) -> bool {
    std::fs::read_dir(output_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.path().join("pipeline_report.json").exists())
}

#[tokio::test]
async fn full_run_reports_totals_and_existing_paths() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(two_area_fixture());
    let config = test_config(dir.path(), &["AI and ML", "Blockchain"]);

    let outcome = orchestrator(config, &fake).run_at(at(0)).await.unwrap();

    let RunOutcome::Complete { report, report_path } = outcome else {
        panic!("expected a complete run");
    };
    assert_eq!(report.run_id, "run_20250314_090000");
    assert_eq!(report.tech_areas, vec!["AI and ML", "Blockchain"]);
    assert_eq!(report.summary.companies_researched, 3);
    assert_eq!(report.summary.companies_validated, 2);
    assert_eq!(report.summary.websites_found, 2);
    assert_eq!(report.summary.verified_websites, 1);
    assert_eq!(report.summary.companies_persisted, 0);

    assert!(report_path.exists());
    for key in ["research", "validation", "websites", "consolidated"] {
        let path = &report.filepaths[key];
        assert!(path.exists(), "{} missing at {}", key, path.display());
    }

    // Bharat scored 6 and stays out of the consolidated list.
    let verified = read_list(&dir.path().join(VERIFIED_COMPANIES_FILE));
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].name, "Acme");
    assert_eq!(verified[0].tech_area, "AI and ML");
}

#[tokio::test]
async fn failed_category_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(
        FakeExtractor::new()
            .research("Blockchain", &["Bharat"])
            .validation("Bharat", true, true)
            .website("Bharat", "https://bharat.io", 8),
    );
    let config = test_config(dir.path(), &["AI and ML", "Blockchain"]);

    let outcome = orchestrator(config, &fake).run_at(at(0)).await.unwrap();
    let RunOutcome::Complete { report, .. } = outcome else {
        panic!("expected a complete run");
    };
    assert_eq!(report.summary.companies_researched, 1);
    assert_eq!(report.summary.verified_websites, 1);

    let research: pipeline::CategoryMap<agents::ResearchResult> =
        CheckpointWriter::load(Stage::Research, &dir.path().join(&report.run_id)).unwrap();
    let failed = research.get("AI and ML").unwrap();
    assert!(failed.companies.is_empty());
    assert!(failed.summary.contains("Error occurred during research"));
}

#[tokio::test]
async fn skipping_stages_without_checkpoints_aborts() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(two_area_fixture());
    let config = PipelineConfig {
        start_from: Stage::FindWebsite,
        ..test_config(dir.path(), &["AI and ML"])
    };

    let outcome = orchestrator(config, &fake).run_at(at(0)).await.unwrap();

    assert!(outcome.is_aborted());
    assert!(!has_report(dir.path()));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn missing_validation_checkpoint_aborts_resume() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(two_area_fixture());

    // An earlier run that stopped after research.
    let first = PipelineConfig {
        run_all_stages: false,
        ..test_config(dir.path(), &["AI and ML"])
    };
    let outcome = orchestrator(first, &fake).run_at(at(0)).await.unwrap();
    assert!(matches!(outcome, RunOutcome::StoppedAfter { stage: Stage::Research, .. }));

    let resumed = PipelineConfig {
        start_from: Stage::FindWebsite,
        resume_run: Some("run_20250314_090000".to_string()),
        ..test_config(dir.path(), &["AI and ML"])
    };
    let outcome = orchestrator(resumed, &fake).run_at(at(1)).await.unwrap();

    let RunOutcome::Aborted { stage, path } = outcome else {
        panic!("expected an aborted run");
    };
    assert_eq!(stage, Stage::Validate);
    assert!(path.ends_with("run_20250314_090000/validation_results.json"));
    assert!(!has_report(dir.path()));
}

#[tokio::test]
async fn resume_copies_earlier_checkpoints_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(two_area_fixture());

    let first = test_config(dir.path(), &["AI and ML", "Blockchain"]);
    orchestrator(first, &fake).run_at(at(0)).await.unwrap();
    let research_calls = fake.call_count(AgentKind::Research);

    let resumed = PipelineConfig {
        start_from: Stage::FindWebsite,
        resume_run: Some("run_20250314_090000".to_string()),
        ..test_config(dir.path(), &["AI and ML", "Blockchain"])
    };
    let outcome = orchestrator(resumed, &fake).run_at(at(5)).await.unwrap();
    let RunOutcome::Complete { report, .. } = outcome else {
        panic!("expected a complete run");
    };

    assert_eq!(report.run_id, "run_20250314_090500");
    assert_eq!(fake.call_count(AgentKind::Research), research_calls);
    assert_eq!(report.summary.companies_researched, 3);

    let old_dir = dir.path().join("run_20250314_090000");
    let new_dir = dir.path().join("run_20250314_090500");
    for stage in [Stage::Research, Stage::Validate] {
        let copied = &report.filepaths[stage.name()];
        assert!(copied.starts_with(&new_dir));
        assert_eq!(
            std::fs::read(CheckpointWriter::path_for(stage, &old_dir)).unwrap(),
            std::fs::read(copied).unwrap()
        );
    }

    // Both runs prepended Acme to the shared list.
    let shared = read_list(&dir.path().join(VERIFIED_COMPANIES_FILE));
    assert_eq!(shared.len(), 2);
}

#[tokio::test]
async fn run_single_stops_after_starting_stage() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(two_area_fixture());
    let config = PipelineConfig {
        run_all_stages: false,
        ..test_config(dir.path(), &["AI and ML", "Blockchain"])
    };

    let outcome = orchestrator(config, &fake).run_at(at(0)).await.unwrap();

    let RunOutcome::StoppedAfter {
        stage,
        checkpoint_path,
        results,
    } = outcome
    else {
        panic!("expected the run to stop after research");
    };
    assert_eq!(stage, Stage::Research);
    assert!(checkpoint_path.ends_with("research_results.json"));
    assert_eq!(results.research.map(|r| r.len()), Some(2));
    assert!(results.validation.is_none());

    let run_dir = checkpoint_path.parent().unwrap();
    assert!(!CheckpointWriter::path_for(Stage::Validate, run_dir).exists());
    assert!(!has_report(dir.path()));
    assert_eq!(fake.call_count(AgentKind::Validation), 0);
}

#[tokio::test]
async fn verified_companies_are_persisted_once() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(
        FakeExtractor::new()
            .research("AI and ML", &["Acme", "Bharat", "Chakra"])
            .validation("Acme", true, true)
            .validation("Bharat", true, true)
            .validation("Chakra", true, true)
            .website("Acme", "https://acme.in", 9)
            .website("Bharat", "https://bharat.io", 8)
            .website("Chakra", "https://chakra.ai", 7),
    );

    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store.insert_new(
        &[CompanyRecord {
            name: "Acme".to_string(),
            website: "https://acme.in".to_string(),
            tech_area: "AI and ML".to_string(),
        }],
        &Default::default(),
    );

    let known = dir.path().join("known.json");
    std::fs::write(&known, r#"{"Bharat": "https://bharat.io"}"#).unwrap();

    let config = PipelineConfig {
        known_names_path: Some(known),
        ..test_config(dir.path(), &["AI and ML"])
    };
    let outcome = orchestrator(config, &fake)
        .with_store(store.clone())
        .run_at(at(0))
        .await
        .unwrap();

    let RunOutcome::Complete { report, .. } = outcome else {
        panic!("expected a complete run");
    };
    assert_eq!(report.summary.verified_websites, 3);
    assert_eq!(report.summary.companies_persisted, 1);

    let names: Vec<_> = store.all().unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Acme", "Chakra"]);
}

#[tokio::test]
async fn websites_found_counts_lookups_not_candidate_urls() {
    let dir = TempDir::new().unwrap();
    // Acme gets three candidate URLs; Lost has no reply, so its lookup fails.
    let fake = Arc::new(
        FakeExtractor::new()
            .research("AI and ML", &["Acme", "Lost"])
            .validation("Acme", true, true)
            .validation("Lost", true, true)
            .websites("Acme", &[("https://acme.in", 9), ("https://acme.co", 5), ("https://acme.io", 4)]),
    );
    let config = test_config(dir.path(), &["AI and ML"]);

    let outcome = orchestrator(config, &fake).run_at(at(0)).await.unwrap();
    let RunOutcome::Complete { report, .. } = outcome else {
        panic!("expected a complete run");
    };
    assert_eq!(report.summary.companies_validated, 2);
    assert_eq!(report.summary.websites_found, 2);
    assert_eq!(report.summary.verified_websites, 1);

    let websites: pipeline::CategoryMap<agents::WebsiteResult> =
        CheckpointWriter::load(Stage::FindWebsite, &dir.path().join(&report.run_id)).unwrap();
    let lookups = &websites.get("AI and ML").unwrap().company_websites;
    assert_eq!(lookups.len(), 2);
    assert_eq!(lookups[0].websites.len(), 3);
    assert!(lookups[1].websites.is_empty());
}

#[tokio::test]
async fn with_pacing_reaches_category_and_company_pauses() {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(
        FakeExtractor::new()
            .research("AI and ML", &["Acme", "Bharat"])
            .research("Blockchain", &["Chakra"])
            .validation("Acme", true, true)
            .validation("Bharat", true, true)
            .validation("Chakra", true, true)
            .website("Acme", "https://acme.in", 9)
            .website("Bharat", "https://bharat.io", 8)
            .website("Chakra", "https://chakra.ai", 7),
    );
    // Default pacing pauses seconds between categories and between companies.
    let config = PipelineConfig {
        tech_areas: vec!["AI and ML".to_string(), "Blockchain".to_string()],
        output_dir: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    };

    let started = Instant::now();
    let mut orchestrator = orchestrator(config, &fake).with_pacing(PaceConfig::None);
    let outcome = orchestrator.run_at(at(0)).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Complete { .. }));
    assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
    assert_eq!(orchestrator.config().pacing, PaceConfig::None);
}
