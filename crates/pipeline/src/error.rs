use std::path::PathBuf;
use thiserror::Error;

use crate::stage::Stage;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Checkpoint for stage '{stage}' not found at {}", path.display())]
    CheckpointNotFound { stage: String, path: PathBuf },

    #[error("Invalid stage index: {0} (expected 1, 2 or 3)")]
    InvalidStage(u8),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error in {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }

    pub fn checkpoint_not_found(stage: Stage, path: impl Into<PathBuf>) -> Self {
        Self::CheckpointNotFound {
            stage: stage.name().to_string(),
            path: path.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CheckpointNotFound { .. })
    }
}
