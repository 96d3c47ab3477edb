use std::path::Path;

use anyhow::{Context, Result};
use slicebench_core::document::{load_chain, ChainDocument, Loaded};
use slicebench_core::CallChain;

/// Load the bench config JSON from disk (delegates to core helper).
pub fn load_bench_config(
    layout: &slicebench_core::db::BenchLayout,
) -> Result<slicebench_core::db::BenchConfig> {
    slicebench_core::db::load_bench_config(layout)
}

/// Resolve the DB path (relative or absolute in config) and open a HistoryDb.
pub fn open_history_db(
    layout: &slicebench_core::db::BenchLayout,
) -> Result<(slicebench_core::db::BenchConfig, std::path::PathBuf, slicebench_core::db::HistoryDb)>
{
    slicebench_core::db::open_history_db(layout)
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Read a chain document and compose it from its entry point.
pub fn load_composed_chain(path: &str) -> Result<(Loaded<ChainDocument>, CallChain)> {
    let loaded = load_chain(Path::new(path))?;
    let chain = loaded
        .document
        .compose()
        .with_context(|| format!("Failed to compose chain from {path}"))?;
    Ok((loaded, chain))
}

/// Render a flag vector as `L..L` style text (`L` live, `.` dead).
pub fn live_mask_string(flags: &[bool]) -> String {
    flags.iter().map(|&l| if l { 'L' } else { '.' }).collect()
}
