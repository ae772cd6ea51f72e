pub const RESEARCH_SYSTEM_PROMPT: &str = r#"You are an expert at researching emerging Indian technology startups.
Your task is to analyze search results and extract information about promising Indian startups
in a specific technology area.

IMPORTANT GUIDELINES:
1. Focus ONLY on INDIAN startups (companies based in India or founded by Indians in India)
2. Look for EMERGING startups, not established companies
   - Startups should be relatively new (ideally less than 7-10 years old)
   - Avoid large enterprises or well-known companies like TCS, Infosys, Wipro, etc.
3. Prioritize companies with innovative approaches or technologies
4. Provide a brief description of what each company does

DO NOT include any company unless you have high confidence it is an Indian startup.
Extract information ONLY from the search results provided."#;

pub const VALIDATION_SYSTEM_PROMPT: &str = r#"You are an expert at validating Indian technology startups.
Analyze the company and verify two key criteria:

1. Is it truly an INDIAN company?
   - Company should be based in India OR founded by Indians in India
   - Check headquarters location, founders' nationality/origin

2. Is it truly a STARTUP (not an established company)?
   - Startups should be relatively new (founded within the last 10 years)
   - Should not be large enterprises or well-established corporations
   - Typically would have raised funding but not be publicly traded

Provide detailed validation notes explaining your decision.
When possible, gather founded year, founders' names, headquarters location and funding information.

BE SKEPTICAL - reject companies if you cannot find sufficient evidence that they meet BOTH criteria."#;

pub const WEBSITE_SYSTEM_PROMPT: &str = r#"You are an expert at finding and verifying official websites for Indian technology startups.

1. Find the OFFICIAL company website (not third-party sites, LinkedIn, Crunchbase, etc.)
2. Verify the authenticity of the website by checking:
   - Domain name matches or is closely related to company name
   - Website content confirms it's the company's official site
   - Contact information includes Indian addresses/phone numbers
3. Assign a confidence score (1-10):
   - 10: Absolutely certain this is the official website
   - 7-9: Very confident but with minor uncertainties
   - 4-6: Moderate confidence, some verification issues
   - 1-3: Low confidence, significant verification issues
4. Provide verification notes explaining the score.

ONLY return websites that you're reasonably confident are official (score 5+)."#;

pub const RESEARCH_SCHEMA: &str = r#"{
  "companies": [
    {"name": "CompanyName", "tech_area": "technology area", "description": "what the company does"}
  ],
  "summary": "brief summary of findings"
}"#;

pub const VALIDATION_SCHEMA: &str = r#"{
  "validated_companies": [
    {"name": "CompanyName", "is_indian": true, "is_startup": true, "founded_year": 2019,
     "founders": "names or null", "headquarters": "city or null", "funding_info": "text or null",
     "validation_notes": "why"}
  ],
  "summary": "summary of the validation"
}"#;

pub const WEBSITE_SCHEMA: &str = r#"{
  "websites": [
    {"company_name": "CompanyName", "official_website": "https://...", "tech_area": "technology area",
     "confidence_score": 8, "verification_notes": "how it was verified"}
  ],
  "summary": "summary of the website search"
}"#;

pub fn research_query(tech_area: &str) -> String {
    format!(
        "top emerging Indian startups in {} technology funding recent innovation",
        tech_area
    )
}

pub fn validation_query(company_name: &str) -> String {
    format!(
        "{} startup India company headquarters founders funding year founded",
        company_name
    )
}

pub fn website_query(company_name: &str) -> String {
    format!(
        "{} official website India technology startup genuine authentic",
        company_name
    )
}

pub fn build_extraction_prompt(query: &str, search_context: &str, schema: &str) -> String {
    format!(
        r#"TASK:
{}

SEARCH RESULTS:
{}

Respond with ONLY a JSON object matching this schema, no markdown, no explanations:
{}

JSON OUTPUT:"#,
        query, search_context, schema
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON object."#,
        invalid_json
    )
}

pub fn build_schema_retry_prompt(reply: &str, error: &str) -> String {
    format!(
        r#"The following JSON does not match the required schema:

{}

Error: {}

Return the corrected JSON object only, with the same content and every field in the expected type. No markdown, no explanations."#,
        reply, error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_embed_subject() {
        assert_eq!(
            research_query("Blockchain"),
            "top emerging Indian startups in Blockchain technology funding recent innovation"
        );
        assert!(validation_query("Acme").starts_with("Acme startup India"));
        assert!(website_query("Acme").starts_with("Acme official website"));
    }

    #[test]
    fn test_extraction_prompt_contains_context() {
        let prompt = build_extraction_prompt("find things", "[{\"url\":\"x\"}]", RESEARCH_SCHEMA);
        assert!(prompt.contains("find things"));
        assert!(prompt.contains("[{\"url\":\"x\"}]"));
        assert!(prompt.contains("\"companies\""));
    }
}
