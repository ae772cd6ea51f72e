//! Stage boundary predicates.

use agents::{
    ResearchResult, ResearchedCompany, ValidatedCompany, ValidationResult, VerifiedCompany,
    WebsiteInfo, WebsiteResult,
};

use crate::category_map::CategoryMap;

/// Minimum confidence score for the consolidated list.
pub const HIGH_CONFIDENCE_THRESHOLD: u8 = 7;

/// Research → validation: every candidate moves on.
pub fn research_candidates(result: &ResearchResult) -> &[ResearchedCompany] {
    &result.companies
}

/// Validation → website finding: both flags must hold.
pub fn passes_validation(company: &ValidatedCompany) -> bool {
    company.is_indian_startup()
}

pub fn forwarded_companies(result: &ValidationResult) -> Vec<&ValidatedCompany> {
    result
        .validated_companies
        .iter()
        .filter(|c| passes_validation(c))
        .collect()
}

pub fn is_high_confidence(website: &WebsiteInfo) -> bool {
    website.confidence_score >= HIGH_CONFIDENCE_THRESHOLD
}

/// High-confidence websites of one category.
pub fn verified_in(result: &WebsiteResult) -> Vec<VerifiedCompany> {
    result
        .company_websites
        .iter()
        .flat_map(|c| c.websites.iter())
        .filter(|w| is_high_confidence(w))
        .map(VerifiedCompany::from)
        .collect()
}

/// Cross-category consolidated list, in category order.
pub fn consolidate(results: &CategoryMap<WebsiteResult>) -> Vec<VerifiedCompany> {
    results.values().flat_map(verified_in).collect()
}
