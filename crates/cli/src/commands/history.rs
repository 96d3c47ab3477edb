use anyhow::{Context, Result};

use crate::canonicalize_or_current;
use crate::commands::open_history_db;

/// List validation runs recorded under `root`, oldest first.
pub fn history_command(root: &str, chain: Option<&str>, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = slicebench_core::db::BenchLayout::new(&root_path);

    let (_config, _db_path, db) = open_history_db(&layout)?;
    let runs = db.list_runs(chain).context("Failed to list validation runs")?;

    if json {
        let serialized = serde_json::to_string_pretty(&runs)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Validation runs:");
    if runs.is_empty() {
        println!("(none)");
        return Ok(());
    }

    for run in runs {
        println!(
            "- {} {} [{}] entry={} statements={} false-live={} false-dead={} f1={:.3}",
            run.recorded_at,
            run.chain,
            run.status.as_str(),
            run.entry,
            run.statements,
            run.false_live,
            run.false_dead,
            run.f1_score
        );
    }

    Ok(())
}
