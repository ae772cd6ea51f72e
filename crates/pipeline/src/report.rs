use agents::{ResearchResult, ValidationResult, WebsiteResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::category_map::CategoryMap;
use crate::filters;

pub const REPORT_FILE: &str = "pipeline_report.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub timestamp: String,
    pub tech_areas: Vec<String>,
    pub summary: ReportSummary,
    /// Stage name (plus `consolidated`) to the file it produced.
    pub filepaths: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub companies_researched: usize,
    pub companies_validated: usize,
    /// Website lookups performed, one per forwarded company, failed ones included.
    pub websites_found: usize,
    pub verified_websites: usize,
    pub companies_persisted: usize,
}

impl ReportSummary {
    pub fn compute(
        research: &CategoryMap<ResearchResult>,
        validation: &CategoryMap<ValidationResult>,
        websites: &CategoryMap<WebsiteResult>,
    ) -> Self {
        Self {
            companies_researched: research.values().map(|r| r.companies.len()).sum(),
            companies_validated: validation
                .values()
                .map(|v| filters::forwarded_companies(v).len())
                .sum(),
            websites_found: websites.values().map(|w| w.company_websites.len()).sum(),
            verified_websites: filters::consolidate(websites).len(),
            companies_persisted: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agents::{CompanyWebsites, ResearchedCompany, ValidatedCompany, WebsiteInfo};

    #[test]
    fn test_summary_counts() {
        let research: CategoryMap<ResearchResult> = [(
            "AI and ML",
            ResearchResult {
                tech_area: "AI and ML".to_string(),
                companies: vec![
                    ResearchedCompany {
                        name: "Acme".to_string(),
                        tech_area: "AI and ML".to_string(),
                        description: String::new(),
                    };
                    3
                ],
                summary: String::new(),
                query_used: String::new(),
            },
        )]
        .into_iter()
        .collect();

        let validated = |name: &str, ok: bool| ValidatedCompany {
            name: name.to_string(),
            is_indian: ok,
            is_startup: true,
            founded_year: None,
            founders: None,
            headquarters: None,
            funding_info: None,
            validation_notes: String::new(),
        };
        let validation: CategoryMap<ValidationResult> = [(
            "AI and ML",
            ValidationResult {
                tech_area: "AI and ML".to_string(),
                validated_companies: vec![validated("A", true), validated("B", false)],
                summary: String::new(),
                original_query: String::new(),
            },
        )]
        .into_iter()
        .collect();

        let site = |score: u8| WebsiteInfo {
            company_name: "A".to_string(),
            official_website: "https://a.in".to_string(),
            tech_area: "AI and ML".to_string(),
            confidence_score: score,
            verification_notes: String::new(),
        };
        let websites: CategoryMap<WebsiteResult> = [(
            "AI and ML",
            WebsiteResult {
                tech_area: "AI and ML".to_string(),
                company_websites: vec![
                    CompanyWebsites {
                        company_name: "A".to_string(),
                        websites: vec![site(9), site(5), site(4)],
                        summary: String::new(),
                    },
                    CompanyWebsites::failed("C", &anyhow::anyhow!("timeout")),
                ],
                count: 2,
            },
        )]
        .into_iter()
        .collect();

        let summary = ReportSummary::compute(&research, &validation, &websites);
        assert_eq!(summary.companies_researched, 3);
        assert_eq!(summary.companies_validated, 1);
        assert_eq!(summary.websites_found, 2);
        assert_eq!(summary.verified_websites, 1);

        let empty = ReportSummary::compute(&research, &validation, &CategoryMap::new());
        assert_eq!(empty.websites_found, 0);
    }
}
