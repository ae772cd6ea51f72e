use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::pacing::PaceConfig;
use crate::stage::Stage;

pub const DEFAULT_TECH_AREAS: [&str; 4] = ["AI and ML", "Blockchain", "Cybersecurity", "IoT"];

/// The full list of technology areas tracked.
pub const TECHNOLOGY_AREAS: [&str; 26] = [
    "AI and ML",
    "Application Infrastructure and Software",
    "Augmented and Virtual Reality",
    "Blockchain",
    "Cloud Computing and Virtualization",
    "Computer Vision",
    "Cryptology",
    "Cybersecurity",
    "Data Science",
    "Digital Forensics",
    "Enterprise Business Technologies",
    "Hardware, Semiconductors, and Embedded",
    "Human Computer Interaction",
    "Identity Management and Authentication",
    "Internet of Things",
    "Location and Presence",
    "Material Science",
    "Mobility and End Points",
    "Natural Language Processing",
    "Next Generation Computing",
    "Operating Systems",
    "Quantum Technology",
    "Software Defined Infrastructure",
    "Unmanned Aerial Vehicles",
    "Wireless and Networking Technologies",
    "5G and 6G",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub tech_areas: Vec<String>,
    pub max_results_per_search: usize,
    pub start_from: Stage,
    /// When false the run stops after `start_from`.
    pub run_all_stages: bool,
    pub output_dir: PathBuf,
    /// Earlier run (directory name under `output_dir`) whose checkpoints
    /// feed the stages before `start_from`. Without it those checkpoints are
    /// looked up in the new run's own directory.
    pub resume_run: Option<String>,
    pub pacing: PaceConfig,
    pub database_path: Option<PathBuf>,
    pub known_names_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tech_areas: DEFAULT_TECH_AREAS.iter().map(|s| s.to_string()).collect(),
            max_results_per_search: 5,
            start_from: Stage::Research,
            run_all_stages: true,
            output_dir: PathBuf::from("results"),
            resume_run: None,
            pacing: PaceConfig::default(),
            database_path: None,
            known_names_path: None,
        }
    }
}

/// Load names that count as already known. Accepts a JSON array of names,
/// an array of objects with a `name` field, or an object keyed by name
/// (the `export_companies` format).
pub fn load_known_names(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| PipelineError::serialization(path, e))?;

    let names = match value {
        serde_json::Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(name) => Some(name),
                serde_json::Value::Object(mut obj) => match obj.remove("name") {
                    Some(serde_json::Value::String(name)) => Some(name),
                    _ => None,
                },
                _ => None,
            })
            .collect(),
        _ => HashSet::new(),
    };
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.tech_areas.len(), 4);
        assert_eq!(config.start_from, Stage::Research);
        assert!(config.run_all_stages);
        assert_eq!(config.pacing, PaceConfig::Fixed { pause_ms: 2000 });
    }

    #[test]
    fn test_known_names_formats() {
        let dir = TempDir::new().unwrap();

        let map = dir.path().join("map.json");
        std::fs::write(&map, r#"{"Acme": "https://acme.in", "Beta": "https://beta.in"}"#).unwrap();
        assert_eq!(load_known_names(&map).unwrap().len(), 2);

        let list = dir.path().join("list.json");
        std::fs::write(&list, r#"["Acme", {"name": "Beta", "website": "x"}, 42]"#).unwrap();
        let names = load_known_names(&list).unwrap();
        assert!(names.contains("Acme") && names.contains("Beta"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_missing_known_names_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_known_names(&dir.path().join("absent.json")).is_err());
    }
}
