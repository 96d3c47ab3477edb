use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::{BenchConfig, BenchLayout, HistoryDb};

/// Load the bench config JSON from disk for a given layout.
pub fn load_bench_config(layout: &BenchLayout) -> Result<BenchConfig> {
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read bench config at {}", layout.config_path.display())
    })?;
    let config: BenchConfig =
        serde_json::from_str(&config_json).context("Failed to parse bench config JSON")?;
    Ok(config)
}

/// Resolve the history DB path (respecting relative/absolute config) and open it.
pub fn open_history_db(layout: &BenchLayout) -> Result<(BenchConfig, PathBuf, HistoryDb)> {
    let config = load_bench_config(layout)?;
    let config_db_path = std::path::Path::new(&config.history.path);
    let db_path = if config_db_path.is_absolute() {
        config_db_path.to_path_buf()
    } else {
        layout.root.join(config_db_path)
    };
    let db = HistoryDb::open(&db_path)
        .with_context(|| format!("Failed to open history database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}
