//! Persistence of verified companies and deduplication against what is
//! already stored.
//!
//! The backing store is SQLite with a unique index on the company name.
//! Nothing here is transactional across runs: two processes can both see a
//! name as new, and the unique index then fails one of their batches.

mod error;
mod schema;
mod sqlite;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;

/// A row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub website: String,
    pub tech_area: String,
}

/// Result of one `insert_new` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    /// Names written by this batch (empty if the batch was rolled back).
    pub inserted: Vec<String>,
    /// Names skipped because they were already known.
    pub skipped: Vec<String>,
    /// Set when the batch failed and was rolled back.
    pub error: Option<String>,
}

impl InsertOutcome {
    pub fn is_rolled_back(&self) -> bool {
        self.error.is_some()
    }
}

pub trait DedupStore: Send + Sync {
    /// Snapshot of every persisted company name.
    fn existing_names(&self) -> StoreResult<HashSet<String>>;

    /// Insert items whose name is neither persisted nor in `external_known`.
    /// All insertions commit as one unit; a failure rolls the batch back and
    /// is reported in the outcome rather than returned.
    fn insert_new(&self, items: &[CompanyRecord], external_known: &HashSet<String>)
    -> InsertOutcome;

    /// Every persisted company in insertion order.
    fn all(&self) -> StoreResult<Vec<CompanyRecord>>;
}
