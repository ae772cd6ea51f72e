use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::stage::Stage;

/// JSON checkpoints: `<stage>_results.json` inside a run directory.
///
/// Writes overwrite in place. There is no temp-file-and-rename, so a crash
/// mid-write can leave a truncated file behind.
pub struct CheckpointWriter;

impl CheckpointWriter {
    pub fn path_for(stage: Stage, run_dir: &Path) -> PathBuf {
        run_dir.join(stage.checkpoint_file_name())
    }

    pub fn save<T: Serialize>(stage: Stage, run_dir: &Path, data: &T) -> Result<PathBuf> {
        let path = Self::path_for(stage, run_dir);
        write_json(&path, data)?;
        info!(stage = %stage, path = %path.display(), "Results saved");
        Ok(path)
    }

    /// Fails with `CheckpointNotFound` if the file is absent.
    pub fn load<T: DeserializeOwned>(stage: Stage, run_dir: &Path) -> Result<T> {
        let path = Self::path_for(stage, run_dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::checkpoint_not_found(stage, path));
            }
            Err(e) => return Err(PipelineError::io(path, e)),
        };
        let data = serde_json::from_str(&content)
            .map_err(|e| PipelineError::serialization(&path, e))?;
        info!(stage = %stage, path = %path.display(), "Loaded existing results");
        Ok(data)
    }
}

/// Pretty-printed (2-space) JSON write used for every artefact of a run.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(data).map_err(|e| PipelineError::serialization(path, e))?;
    std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}
