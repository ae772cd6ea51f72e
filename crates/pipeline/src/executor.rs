use std::sync::Arc;

use agents::{
    CompanyWebsites, ResearchResult, SearchAndExtract, ValidatedCompany, ValidationResult,
    WebsiteResult,
};
use tracing::{error, info, warn};

use crate::filters;
use crate::pacing::{self, PaceConfig};

/// Result of running one stage for one category. The stage result is always
/// usable; `failures` counts the external calls that went wrong on the way.
#[derive(Debug, Clone)]
pub struct CategoryOutcome<T> {
    pub result: T,
    pub failures: usize,
}

impl<T> CategoryOutcome<T> {
    fn ok(result: T) -> Self {
        Self { result, failures: 0 }
    }

    pub fn succeeded(&self) -> bool {
        self.failures == 0
    }
}

/// Runs a stage for a single category. Never returns an error: failures of
/// the external call are logged and folded into the stage result so one
/// category cannot abort the batch.
#[derive(Clone)]
pub struct StageExecutor {
    extractor: Arc<dyn SearchAndExtract>,
    max_results: usize,
    company_pace: PaceConfig,
}

impl StageExecutor {
    pub fn new(extractor: Arc<dyn SearchAndExtract>, max_results: usize, company_pace: PaceConfig) -> Self {
        Self {
            extractor,
            max_results,
            company_pace,
        }
    }

    /// Same executor with a different research result limit.
    pub fn with_max_results(&self, max_results: usize) -> Self {
        Self {
            max_results,
            ..self.clone()
        }
    }

    /// Same executor with a different pause between per-company lookups.
    pub fn with_company_pace(&self, company_pace: PaceConfig) -> Self {
        Self {
            company_pace,
            ..self.clone()
        }
    }

    pub async fn research(&self, tech_area: &str) -> CategoryOutcome<ResearchResult> {
        info!(tech_area, "Researching");

        match agents::research_tech_area(self.extractor.as_ref(), tech_area, self.max_results).await {
            Ok(result) => {
                info!(
                    tech_area,
                    companies = result.companies.len(),
                    "Found potential companies"
                );
                CategoryOutcome::ok(result)
            }
            Err(e) => {
                error!(tech_area, error = %format!("{:#}", e), "Error researching tech area");
                CategoryOutcome {
                    result: ResearchResult {
                        tech_area: tech_area.to_string(),
                        companies: Vec::new(),
                        summary: format!("Error occurred during research: {:#}", e),
                        query_used: agents::prompt::research_query(tech_area),
                    },
                    failures: 1,
                }
            }
        }
    }

    /// Validate every research candidate of a category. A candidate whose
    /// lookup fails is kept as a record with both flags false.
    pub async fn validate(&self, research: &ResearchResult) -> CategoryOutcome<ValidationResult> {
        let tech_area = research.tech_area.as_str();
        info!(tech_area, "Validating companies");

        let candidates = filters::research_candidates(research);
        let mut pacer = self.company_pace.halved().build();
        let mut validated: Vec<ValidatedCompany> = Vec::new();
        let mut failures = 0;

        for (i, company) in candidates.iter().enumerate() {
            let succeeded = match agents::validate_company(self.extractor.as_ref(), company).await {
                Ok(records) => {
                    validated.extend(records);
                    true
                }
                Err(e) => {
                    warn!(company = %company.name, error = %format!("{:#}", e), "Error validating company");
                    validated.push(ValidatedCompany::failed(&company.name, &e));
                    failures += 1;
                    false
                }
            };
            if i + 1 < candidates.len() {
                pacing::pause(pacer.as_mut(), succeeded).await;
            }
        }

        let passing = validated.iter().filter(|c| filters::passes_validation(c)).count();
        info!(
            tech_area,
            valid = passing,
            total = validated.len(),
            "Companies validated as Indian startups"
        );

        let summary = format!(
            "Validation completed for {} companies in the {} sector. Found {} valid Indian startups. {} companies failed validation.",
            validated.len(),
            tech_area,
            passing,
            validated.len() - passing
        );

        CategoryOutcome {
            result: ValidationResult {
                tech_area: tech_area.to_string(),
                validated_companies: validated,
                summary,
                original_query: research.query_used.clone(),
            },
            failures,
        }
    }

    /// Look up websites for the companies that passed validation.
    pub async fn find_websites(&self, validation: &ValidationResult) -> CategoryOutcome<WebsiteResult> {
        let tech_area = validation.tech_area.as_str();
        let forwarded = filters::forwarded_companies(validation);

        if forwarded.is_empty() {
            info!(tech_area, "No valid Indian startups found");
        } else {
            info!(tech_area, companies = forwarded.len(), "Finding websites for valid Indian startups");
        }

        let mut pacer = self.company_pace.build();
        let mut company_websites: Vec<CompanyWebsites> = Vec::new();
        let mut failures = 0;

        for (i, company) in forwarded.iter().enumerate() {
            let found = agents::find_company_website(self.extractor.as_ref(), &company.name, tech_area).await;
            let succeeded = match found {
                Ok(websites) => {
                    info!(company = %company.name, websites = websites.websites.len(), "Website search completed");
                    company_websites.push(websites);
                    true
                }
                Err(e) => {
                    warn!(company = %company.name, error = %format!("{:#}", e), "Error finding website");
                    company_websites.push(CompanyWebsites::failed(&company.name, &e));
                    failures += 1;
                    false
                }
            };
            if i + 1 < forwarded.len() {
                pacing::pause(pacer.as_mut(), succeeded).await;
            }
        }

        CategoryOutcome {
            result: WebsiteResult {
                tech_area: tech_area.to_string(),
                count: company_websites.len(),
                company_websites,
            },
            failures,
        }
    }
}
