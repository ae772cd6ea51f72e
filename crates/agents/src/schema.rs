use serde::{Deserialize, Deserializer, Serialize};

/// A startup candidate surfaced by the research agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchedCompany {
    pub name: String,
    #[serde(default)]
    pub tech_area: String,
    #[serde(default)]
    pub description: String,
}

/// Research output for one technology area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub tech_area: String,
    pub companies: Vec<ResearchedCompany>,
    pub summary: String,
    #[serde(default)]
    pub query_used: String,
}

/// Verdict on whether a candidate is an Indian, early-stage company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedCompany {
    pub name: String,
    #[serde(default)]
    pub is_indian: bool,
    #[serde(default)]
    pub is_startup: bool,
    #[serde(default, deserialize_with = "lenient_year")]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub founders: Option<String>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub funding_info: Option<String>,
    #[serde(default)]
    pub validation_notes: String,
}

impl ValidatedCompany {
    /// Audit record kept when validating a company failed outright.
    pub fn failed(name: &str, error: &anyhow::Error) -> Self {
        Self {
            name: name.to_string(),
            is_indian: false,
            is_startup: false,
            founded_year: None,
            founders: None,
            headquarters: None,
            funding_info: None,
            validation_notes: format!("Validation failed due to error: {:#}", error),
        }
    }

    pub fn is_indian_startup(&self) -> bool {
        self.is_indian && self.is_startup
    }
}

/// Validation output for one technology area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub tech_area: String,
    pub validated_companies: Vec<ValidatedCompany>,
    pub summary: String,
    #[serde(default)]
    pub original_query: String,
}

/// One candidate website for a company, scored 1-10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteInfo {
    pub company_name: String,
    pub official_website: String,
    #[serde(default)]
    pub tech_area: String,
    #[serde(deserialize_with = "clamped_score")]
    pub confidence_score: u8,
    #[serde(default)]
    pub verification_notes: String,
}

/// A number as models actually emit it: integer, float or numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    fn to_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(n) => Some(*n),
            LooseNumber::Float(f) if f.is_finite() => Some(f.round() as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            }
        }
    }
}

fn clamped_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = LooseNumber::deserialize(deserializer)?;
    let score = raw
        .to_i64()
        .ok_or_else(|| serde::de::Error::custom("confidence_score is not a number"))?;
    Ok(score.clamp(1, 10) as u8)
}

/// Missing, null or non-numeric years become `None`.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|n| n.to_i64())
        .and_then(|n| i32::try_from(n).ok()))
}

/// Website search output for a single company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyWebsites {
    pub company_name: String,
    pub websites: Vec<WebsiteInfo>,
    pub summary: String,
}

impl CompanyWebsites {
    pub fn failed(company_name: &str, error: &anyhow::Error) -> Self {
        Self {
            company_name: company_name.to_string(),
            websites: Vec::new(),
            summary: format!("Failed to find website due to error: {:#}", error),
        }
    }
}

/// Website search output for one technology area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteResult {
    pub tech_area: String,
    pub company_websites: Vec<CompanyWebsites>,
    pub count: usize,
}

/// Entry of the consolidated high-confidence list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedCompany {
    pub name: String,
    pub website: String,
    pub tech_area: String,
    pub confidence: u8,
}

impl From<&WebsiteInfo> for VerifiedCompany {
    fn from(info: &WebsiteInfo) -> Self {
        Self {
            name: info.company_name.clone(),
            website: info.official_website.clone(),
            tech_area: info.tech_area.clone(),
            confidence: info.confidence_score,
        }
    }
}

// Shapes the model is asked to produce.

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchExtraction {
    #[serde(default)]
    pub companies: Vec<ResearchedCompany>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationExtraction {
    #[serde(default)]
    pub validated_companies: Vec<ValidatedCompany>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebsiteExtraction {
    #[serde(default)]
    pub websites: Vec<WebsiteInfo>,
    #[serde(default)]
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_score_is_clamped() {
        let info: WebsiteInfo = serde_json::from_str(
            r#"{"company_name":"Acme","official_website":"https://acme.in","confidence_score":14}"#,
        )
        .unwrap();
        assert_eq!(info.confidence_score, 10);

        let info: WebsiteInfo = serde_json::from_str(
            r#"{"company_name":"Acme","official_website":"https://acme.in","confidence_score":0}"#,
        )
        .unwrap();
        assert_eq!(info.confidence_score, 1);
    }

    #[test]
    fn test_score_accepts_float_and_string() {
        for raw in ["8.0", "\"8\"", "\" 8 \""] {
            let info: WebsiteInfo = serde_json::from_str(&format!(
                r#"{{"company_name":"Acme","official_website":"https://acme.in","confidence_score":{}}}"#,
                raw
            ))
            .unwrap();
            assert_eq!(info.confidence_score, 8, "score {}", raw);
        }

        let err = serde_json::from_str::<WebsiteInfo>(
            r#"{"company_name":"Acme","official_website":"https://acme.in","confidence_score":"high"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_founded_year_is_lenient() {
        let parse = |year: &str| -> Option<i32> {
            let json = format!(r#"{{"name":"Acme","is_indian":true,"is_startup":true,"founded_year":{}}}"#, year);
            serde_json::from_str::<ValidatedCompany>(&json).unwrap().founded_year
        };
        assert_eq!(parse("\"2019\""), Some(2019));
        assert_eq!(parse("2019.0"), Some(2019));
        assert_eq!(parse("2019"), Some(2019));
        assert_eq!(parse("null"), None);
        assert_eq!(parse("\"unknown\""), None);

        let company: ValidatedCompany =
            serde_json::from_str(r#"{"name":"Acme","is_indian":true,"is_startup":true}"#).unwrap();
        assert_eq!(company.founded_year, None);
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let company: ValidatedCompany = serde_json::from_str(r#"{"name":"Acme","is_indian":true}"#).unwrap();
        assert!(company.is_indian);
        assert!(!company.is_startup);
        assert!(!company.is_indian_startup());
    }

    #[test]
    fn test_failed_validation_is_never_a_startup() {
        let err = anyhow::anyhow!("search quota exceeded");
        let record = ValidatedCompany::failed("Acme", &err);
        assert!(!record.is_indian_startup());
        assert!(record.validation_notes.contains("search quota exceeded"));
    }
}
