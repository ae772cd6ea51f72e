#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use agents::prompt::{research_query, validation_query, website_query};
use agents::{AgentKind, ExtractionRequest, SearchAndExtract};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use pipeline::{PaceConfig, PipelineConfig};
use serde_json::{Value, json};

/// Replies keyed by query text. A query with no fixture fails like an
/// unreachable provider would.
#[derive(Default)]
pub struct FakeExtractor {
    replies: HashMap<String, Value>,
    calls: Mutex<Vec<AgentKind>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn research(mut self, tech_area: &str, companies: &[&str]) -> Self {
        let companies: Vec<Value> = companies
            .iter()
            .map(|name| json!({"name": name, "description": format!("{name} builds things")}))
            .collect();
        self.replies.insert(
            research_query(tech_area),
            json!({"companies": companies, "summary": format!("{} startups", companies.len())}),
        );
        self
    }

    pub fn validation(mut self, name: &str, is_indian: bool, is_startup: bool) -> Self {
        self.replies.insert(
            validation_query(name),
            json!({
                "validated_companies": [{
                    "name": name,
                    "is_indian": is_indian,
                    "is_startup": is_startup,
                    "founded_year": 2019,
                    "headquarters": "Bengaluru",
                    "validation_notes": "checked"
                }],
                "summary": "validated"
            }),
        );
        self
    }

    pub fn website(mut self, name: &str, url: &str, score: i64) -> Self {
        self.replies.insert(
            website_query(name),
            json!({
                "websites": [{
                    "company_name": name,
                    "official_website": url,
                    "confidence_score": score,
                    "verification_notes": "domain matches"
                }],
                "summary": "found"
            }),
        );
        self
    }

    pub fn websites(mut self, name: &str, sites: &[(&str, i64)]) -> Self {
        let websites: Vec<Value> = sites
            .iter()
            .map(|(url, score)| {
                json!({"company_name": name, "official_website": url, "confidence_score": score})
            })
            .collect();
        self.replies.insert(
            website_query(name),
            json!({"websites": websites, "summary": format!("{} candidates", websites.len())}),
        );
        self
    }

    pub fn calls(&self) -> Vec<AgentKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, kind: AgentKind) -> usize {
        self.calls().into_iter().filter(|k| *k == kind).count()
    }
}

#[async_trait]
impl SearchAndExtract for FakeExtractor {
    async fn search_and_extract(&self, request: &ExtractionRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.agent);
        self.replies
            .get(&request.query)
            .cloned()
            .ok_or_else(|| anyhow!("search service unavailable for '{}'", request.query))
    }
}

/// Two categories; Acme and Bharat pass validation, Cloudco is not Indian.
pub fn two_area_fixture() -> FakeExtractor {
    FakeExtractor::new()
        .research("AI and ML", &["Acme", "Cloudco"])
        .research("Blockchain", &["Bharat"])
        .validation("Acme", true, true)
        .validation("Cloudco", false, true)
        .validation("Bharat", true, true)
        .website("Acme", "https://acme.in", 9)
        .website("Bharat", "https://bharat.io", 6)
}

pub fn test_config(output_dir: &std::path::Path, tech_areas: &[&str]) -> PipelineConfig {
    PipelineConfig {
        tech_areas: tech_areas.iter().map(|s| s.to_string()).collect(),
        output_dir: output_dir.to_path_buf(),
        pacing: PaceConfig::None,
        ..PipelineConfig::default()
    }
}
