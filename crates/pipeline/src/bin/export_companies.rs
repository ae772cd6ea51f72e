//! Dump the verified-companies database as `{name: website}` JSON, or as a
//! table with `--list`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use store::{DedupStore, SqliteStore};

#[derive(Parser)]
#[command(name = "export_companies")]
#[command(about = "Export persisted companies", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(short, long, default_value = "results/companies.db")]
    database: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a table instead of JSON
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = SqliteStore::open(&cli.database)
        .with_context(|| format!("Failed to open database {}", cli.database.display()))?;
    let companies = store.all()?;

    if cli.list {
        println!("{:<40} {:<50} {}", "NAME", "WEBSITE", "TECH AREA");
        for c in &companies {
            println!("{:<40} {:<50} {}", c.name, c.website, c.tech_area);
        }
        println!("\n{} companies", companies.len());
        return Ok(());
    }

    let map: Map<String, Value> = companies
        .into_iter()
        .map(|c| (c.name, Value::String(c.website)))
        .collect();
    let json = serde_json::to_string_pretty(&Value::Object(map))?;

    match cli.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
