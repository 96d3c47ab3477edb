use std::path::{Path, PathBuf};

/// Logical layout of a bench root on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself;
/// frontends create directories and files based on it.
#[derive(Debug, Clone)]
pub struct BenchLayout {
    /// Root directory of the bench.
    pub root: PathBuf,
    /// Directory for internal metadata (.slicebench).
    pub meta_dir: PathBuf,
    /// Path to the config file (JSON).
    pub config_path: PathBuf,
    /// Path to the validation history database.
    pub db_path: PathBuf,
    /// Directory for saved validation reports.
    pub reports_dir: PathBuf,
}

impl BenchLayout {
    /// Compute the default layout for a bench rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".slicebench");
        let config_path = meta_dir.join("config.json");
        let db_path = meta_dir.join("history.db");
        let reports_dir = root.join("reports");

        Self { root, meta_dir, config_path, db_path, reports_dir }
    }

    /// Database path suitable for storing in `BenchConfig`, relative to `root`
    /// when possible.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Path for a saved report of `chain` taken at `stamp`.
    pub fn report_path(&self, chain: &str, stamp: &str) -> PathBuf {
        self.reports_dir.join(format!("{chain}-{stamp}.json"))
    }
}
