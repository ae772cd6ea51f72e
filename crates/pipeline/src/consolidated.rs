use agents::VerifiedCompany;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::checkpoint::write_json;
use crate::error::Result;

pub const VERIFIED_COMPANIES_FILE: &str = "verified_companies.json";

/// Write this run's high-confidence list into the run directory.
pub fn write_run_list(run_dir: &Path, verified: &[VerifiedCompany]) -> Result<PathBuf> {
    let path = run_dir.join(VERIFIED_COMPANIES_FILE);
    write_json(&path, verified)?;
    info!(
        websites = verified.len(),
        path = %path.display(),
        "Consolidated results saved"
    );
    Ok(path)
}

/// Prepend `new_entries` to the shared list under `output_dir`, which
/// accumulates across invocations. Unreadable content is treated as empty.
pub fn prepend_shared(output_dir: &Path, new_entries: &[VerifiedCompany]) -> Result<PathBuf> {
    let path = output_dir.join(VERIFIED_COMPANIES_FILE);
    let existing = read_list(&path);

    let mut combined = new_entries.to_vec();
    combined.extend(existing);

    write_json(&path, &combined)?;
    info!(
        added = new_entries.len(),
        total = combined.len(),
        path = %path.display(),
        "Shared verified list updated"
    );
    Ok(path)
}

pub fn read_list(path: &Path) -> Vec<VerifiedCompany> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read verified list, starting empty");
            return Vec::new();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Verified list is not valid JSON, starting empty");
        Vec::new()
    })
}
