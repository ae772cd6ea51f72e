//! The three agents: each pairs a prompt and output schema with one
//! `SearchAndExtract` call and parses the reply into typed records.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::SearchDepth;
use crate::extractor::{AgentKind, ExtractionRequest, SearchAndExtract};
use crate::prompt;
use crate::schema::{
    CompanyWebsites, ResearchExtraction, ResearchResult, ResearchedCompany, ValidatedCompany,
    ValidationExtraction, WebsiteExtraction,
};

/// Search results consulted per validation / website lookup.
pub const LOOKUP_MAX_RESULTS: usize = 3;

fn conforms<T: DeserializeOwned>(value: &serde_json::Value) -> serde_json::Result<()> {
    T::deserialize(value).map(|_| ())
}

/// Research startups for one technology area.
pub async fn research_tech_area(
    extractor: &dyn SearchAndExtract,
    tech_area: &str,
    max_results: usize,
) -> Result<ResearchResult> {
    let query = prompt::research_query(tech_area);
    let request = ExtractionRequest {
        agent: AgentKind::Research,
        system_prompt: prompt::RESEARCH_SYSTEM_PROMPT,
        query: query.clone(),
        max_results,
        search_depth: SearchDepth::Advanced,
        schema_hint: prompt::RESEARCH_SCHEMA,
        validate: conforms::<ResearchExtraction>,
    };

    let value = extractor.search_and_extract(&request).await?;
    let extraction: ResearchExtraction =
        serde_json::from_value(value).context("Failed to parse research result")?;

    let companies = extraction
        .companies
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .map(|c| ResearchedCompany {
            tech_area: if c.tech_area.is_empty() {
                tech_area.to_string()
            } else {
                c.tech_area
            },
            ..c
        })
        .collect();

    Ok(ResearchResult {
        tech_area: tech_area.to_string(),
        companies,
        summary: extraction.summary,
        query_used: query,
    })
}

/// Validate a single research candidate. The model may return more than one
/// record (e.g. when the name is ambiguous); all are kept.
pub async fn validate_company(
    extractor: &dyn SearchAndExtract,
    company: &ResearchedCompany,
) -> Result<Vec<ValidatedCompany>> {
    let request = ExtractionRequest {
        agent: AgentKind::Validation,
        system_prompt: prompt::VALIDATION_SYSTEM_PROMPT,
        query: prompt::validation_query(&company.name),
        max_results: LOOKUP_MAX_RESULTS,
        search_depth: SearchDepth::Advanced,
        schema_hint: prompt::VALIDATION_SCHEMA,
        validate: conforms::<ValidationExtraction>,
    };

    let value = extractor.search_and_extract(&request).await?;
    let extraction: ValidationExtraction =
        serde_json::from_value(value).context("Failed to parse validation result")?;

    Ok(extraction.validated_companies)
}

/// Find and score official websites for a validated company.
pub async fn find_company_website(
    extractor: &dyn SearchAndExtract,
    company_name: &str,
    tech_area: &str,
) -> Result<CompanyWebsites> {
    let request = ExtractionRequest {
        agent: AgentKind::WebsiteFinder,
        system_prompt: prompt::WEBSITE_SYSTEM_PROMPT,
        query: prompt::website_query(company_name),
        max_results: LOOKUP_MAX_RESULTS,
        search_depth: SearchDepth::Advanced,
        schema_hint: prompt::WEBSITE_SCHEMA,
        validate: conforms::<WebsiteExtraction>,
    };

    let value = extractor.search_and_extract(&request).await?;
    let mut extraction: WebsiteExtraction =
        serde_json::from_value(value).context("Failed to parse website result")?;

    for website in &mut extraction.websites {
        if website.tech_area.is_empty() {
            website.tech_area = tech_area.to_string();
        }
    }

    Ok(CompanyWebsites {
        company_name: company_name.to_string(),
        websites: extraction.websites,
        summary: extraction.summary,
    })
}
