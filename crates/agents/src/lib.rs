pub mod agents;
pub mod cache;
pub mod config;
pub mod extractor;
pub mod llm;
pub mod prompt;
pub mod schema;
pub mod search;

pub use agents::{find_company_website, research_tech_area, validate_company};
pub use cache::{CacheStats, SearchCache};
pub use config::{AgentConfig, SearchDepth};
pub use extractor::{AgentKind, ExtractionRequest, SearchAndExtract, WebExtractor};
pub use llm::ChatClient;
pub use schema::{
    CompanyWebsites, ResearchResult, ResearchedCompany, ValidatedCompany, ValidationResult,
    VerifiedCompany, WebsiteInfo, WebsiteResult,
};
pub use search::SearchClient;
