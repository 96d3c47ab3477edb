use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::db::{open_history_db, BenchConfig, BenchLayout, HistoryDb};

/// Convenience wrapper bundling layout, config, db path, and an open HistoryDb.
#[derive(Debug)]
pub struct BenchContext {
    pub layout: BenchLayout,
    pub config: BenchConfig,
    pub db_path: PathBuf,
    pub db: HistoryDb,
}

impl BenchContext {
    /// Load the bench config and open the history database for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = BenchLayout::new(root);
        let (config, db_path, db) = open_history_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }
}
