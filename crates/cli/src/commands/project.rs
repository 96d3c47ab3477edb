use std::fs;

use crate::commands::{open_history_db, print_dir_status};
use crate::{canonicalize_or_current, infer_bench_name};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct BenchInfoSnapshot {
    pub name: String,
    pub description: Option<String>,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub schema_version: i32,
    pub max_steps: u64,
    pub layout: BenchInfoLayout,
    pub recorded_runs: usize,
    pub chains: Vec<String>,
}

#[derive(Serialize)]
pub struct BenchInfoLayout {
    pub meta_dir: String,
    pub reports_dir: String,
}

/// Initialize a new bench root at `root`.
pub fn init_bench_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = slicebench_core::db::BenchLayout::new(&root_path);

    let bench_name = match name {
        Some(n) => n,
        None => infer_bench_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;

    let db_path_rel = layout.db_path_relative_string();
    let config = slicebench_core::db::BenchConfig::new(&bench_name, db_path_rel);

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write bench config: {}", layout.config_path.display())
    })?;

    // Create the history database up front so `validate --record` and
    // `history` find it.
    slicebench_core::db::HistoryDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize history database at {}", layout.db_path.display())
    })?;

    println!("Initialized slicebench root:");
    println!("  Name: {}", bench_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", config.history.path);
    println!("  Reports dir: {}", layout.reports_dir.display());

    Ok(())
}

/// Show basic information about an existing bench root.
pub fn bench_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = slicebench_core::db::BenchLayout::new(&root_path);

    let (config, _db_path, db) = open_history_db(&layout)?;
    let schema_version = db.schema_version().context("Failed to read history schema version")?;
    let runs = db.list_runs(None).context("Failed to list validation runs")?;
    let mut chains: Vec<String> = runs.iter().map(|r| r.chain.clone()).collect();
    chains.sort();
    chains.dedup();

    if json {
        let snapshot = BenchInfoSnapshot {
            name: config.name.clone(),
            description: config.description.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.history.path.clone(),
            schema_version,
            max_steps: config.eval.max_steps,
            layout: BenchInfoLayout {
                meta_dir: layout.meta_dir.display().to_string(),
                reports_dir: layout.reports_dir.display().to_string(),
            },
            recorded_runs: runs.len(),
            chains,
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("slicebench Info");
    println!("===============");
    println!("Name: {}", config.name);
    if let Some(desc) = &config.description {
        println!("Description: {}", desc);
    }
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.history.path);
    println!("Schema version: {}", schema_version);
    println!("Interpreter step budget: {}", config.eval.max_steps);
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.slicebench)", &layout.meta_dir);
    print_dir_status("Reports dir", &layout.reports_dir);
    println!();
    println!("Recorded runs: {}", runs.len());
    if !chains.is_empty() {
        println!("Chains: {}", chains.join(", "));
    }

    Ok(())
}
