use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;

/// The three ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Research = 1,
    Validate = 2,
    FindWebsite = 3,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Research, Stage::Validate, Stage::FindWebsite];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Name used for checkpoint files and report keys.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Validate => "validation",
            Stage::FindWebsite => "websites",
        }
    }

    pub fn checkpoint_file_name(self) -> String {
        format!("{}_results.json", self.name())
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Research => "STARTUP RESEARCH",
            Stage::Validate => "STARTUP VALIDATION",
            Stage::FindWebsite => "WEBSITE FINDER",
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = PipelineError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            1 => Ok(Stage::Research),
            2 => Ok(Stage::Validate),
            3 => Ok(Stage::FindWebsite),
            other => Err(PipelineError::InvalidStage(other)),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_index_roundtrip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::try_from(stage.index()).unwrap(), stage);
        }
        assert!(matches!(
            Stage::try_from(4),
            Err(PipelineError::InvalidStage(4))
        ));
    }

    #[test]
    fn test_checkpoint_file_names() {
        assert_eq!(Stage::Research.checkpoint_file_name(), "research_results.json");
        assert_eq!(Stage::Validate.checkpoint_file_name(), "validation_results.json");
        assert_eq!(Stage::FindWebsite.checkpoint_file_name(), "websites_results.json");
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(Stage::Research < Stage::Validate);
        assert!(Stage::Validate < Stage::FindWebsite);
    }
}
