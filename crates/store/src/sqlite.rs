use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{error, info};

use crate::error::{StoreError, StoreResult};
use crate::schema;
use crate::{CompanyRecord, DedupStore, InsertOutcome};

/// SQLite-backed company store. Thread-safe via `parking_lot::Mutex`.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database file.
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=10000;
            ",
        )?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> StoreResult<()> {
        for sql in schema::all_schemas() {
            conn.execute_batch(sql)?;
        }

        let current: Option<i32> = conn
            .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match current {
            None => {
                conn.execute(
                    "INSERT INTO schema_version (id, version) VALUES (1, ?1)",
                    params![schema::SCHEMA_VERSION],
                )?;
                info!("Initialized company store schema version {}", schema::SCHEMA_VERSION);
            }
            Some(v) if v > schema::SCHEMA_VERSION => {
                return Err(StoreError::UnsupportedSchema {
                    found: v,
                    supported: schema::SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Run raw SQL against the connection (test fixtures, maintenance).
    pub fn execute_batch(&self, sql: &str) -> StoreResult<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    fn names_in(conn: &Connection) -> StoreResult<HashSet<String>> {
        let mut stmt = conn.prepare("SELECT name FROM companies")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    fn insert_batch(
        conn: &mut Connection,
        items: &[CompanyRecord],
        external_known: &HashSet<String>,
    ) -> StoreResult<InsertOutcome> {
        let tx = conn.transaction()?;
        let mut known = Self::names_in(&tx)?;
        let mut outcome = InsertOutcome::default();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO companies (name, website, tech_area) VALUES (?1, ?2, ?3)",
            )?;

            for item in items {
                if known.contains(&item.name) || external_known.contains(&item.name) {
                    info!(company = %item.name, "Company already exists");
                    outcome.skipped.push(item.name.clone());
                    continue;
                }

                stmt.execute(params![item.name, item.website, item.tech_area])?;
                info!(company = %item.name, "Adding new company");
                known.insert(item.name.clone());
                outcome.inserted.push(item.name.clone());
            }
        }

        tx.commit()?;
        Ok(outcome)
    }
}

impl DedupStore for SqliteStore {
    fn existing_names(&self) -> StoreResult<HashSet<String>> {
        let conn = self.conn.lock();
        Self::names_in(&conn)
    }

    fn insert_new(
        &self,
        items: &[CompanyRecord],
        external_known: &HashSet<String>,
    ) -> InsertOutcome {
        let mut conn = self.conn.lock();

        match Self::insert_batch(&mut conn, items, external_known) {
            Ok(outcome) => {
                info!(
                    inserted = outcome.inserted.len(),
                    skipped = outcome.skipped.len(),
                    "Saved companies to database"
                );
                outcome
            }
            Err(e) => {
                // The transaction was dropped uncommitted, so nothing from
                // this batch is persisted.
                error!(error = %e, companies = items.len(), "Database error, batch rolled back");
                InsertOutcome {
                    inserted: Vec::new(),
                    skipped: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn all(&self) -> StoreResult<Vec<CompanyRecord>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT name, website, tech_area FROM companies ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CompanyRecord {
                    name: row.get(0)?,
                    website: row.get(1)?,
                    tech_area: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
