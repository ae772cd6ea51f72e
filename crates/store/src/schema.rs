pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL
);
"#;

pub const COMPANIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    website TEXT NOT NULL,
    tech_area TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_companies_name ON companies(name);
CREATE INDEX IF NOT EXISTS idx_companies_tech_area ON companies(tech_area);
"#;

pub fn all_schemas() -> &'static [&'static str] {
    &[SCHEMA_VERSION_TABLE, COMPANIES_TABLE]
}
