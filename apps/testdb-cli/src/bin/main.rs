use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use testdb_core::config::Config;
use testdb_core::traits::{Engine, IndexStore};
use testdb_core::types::Record;
use testdb_match::TestingEngine;
use testdb_store::JsonFileStore;

/// Fuzzy search index for tests, stored in a JSON file
#[derive(Parser)]
#[command(name = "testdb", version, long_about = None)]
struct Cli {
    /// Storage file, overriding `testing.storage` from config
    #[arg(long, global = true, env = "TESTDB_STORAGE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty storage file
    Init,
    /// Index records from a JSON file, or every *.json file under a directory
    Ingest { path: PathBuf },
    /// Remove records by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Rank indexed records against a query
    Search {
        query: String,
        /// Print at most this many hits
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print the raw `{"hits": [...]}` document
        #[arg(long)]
        json: bool,
    },
    /// Print every stored record
    Dump,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().context("loading configuration")?;
    if let Some(path) = &cli.storage {
        config = config.with_storage(path);
    }
    let mut engine = TestingEngine::from_config(config)?;

    match cli.command {
        Commands::Init => {
            let path = engine.store().path()?;
            if engine.store().init()? {
                println!("Created {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
        }
        Commands::Ingest { path } => {
            let count = ingest(engine.store_mut(), &path)?;
            println!("Indexed {count} records from {}", path.display());
        }
        Commands::Delete { ids } => {
            let records: Vec<Record> = ids.iter().map(|id| Record::new().with("id", id.as_str())).collect();
            engine.delete(&records)?;
            println!("Deleted {} ids", ids.len());
        }
        Commands::Search { query, limit, json } => {
            let results = engine.search(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }
            let total = engine.get_total_count(&results);
            println!("Found {total} hits for \"{query}\"");
            for (i, hit) in results.hits.iter().take(limit.unwrap_or(total)).enumerate() {
                let id = hit.id().map(|id| id.to_string()).unwrap_or_default();
                println!("{:>4}. lev={:<2} id={}  {}", i + 1, hit.lev, id, serde_json::to_string(&hit.record)?);
            }
        }
        Commands::Dump => {
            let table = engine.store().get_all()?;
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
    }
    Ok(())
}

fn ingest(store: &mut JsonFileStore, path: &Path) -> Result<usize> {
    let files = json_files(path);
    if files.is_empty() {
        println!("No .json files found under {}.", path.display());
        return Ok(0);
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut count = 0;
    for file in &files {
        pb.set_message(file.display().to_string());
        let data = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        count += store
            .upsert_json(&data)
            .with_context(|| format!("indexing {}", file.display()))?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    info!(files = files.len(), records = count, "ingest complete");
    Ok(count)
}

fn json_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return vec![root.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}
