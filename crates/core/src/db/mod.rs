//! Bench root configuration, on-disk layout, and validation history.
//!
//! - `BenchConfig`: serializable settings stored at `.slicebench/config.json`.
//! - `BenchLayout`: computed paths for the bench root.
//! - `HistoryDb`: a small SQLite wrapper recording validation runs.
//! - `BenchContext`: all of the above, opened together.

mod config;
mod context;
mod history;
mod layout;
mod models;
mod util;

pub use config::{BenchConfig, EvalConfig, HistoryConfig};
pub use context::BenchContext;
pub use history::{DbError, DbResult, HistoryDb, CURRENT_SCHEMA_VERSION};
pub use layout::BenchLayout;
pub use models::{file_stamp_now, timestamp_now, RunStatus, ValidationRunRecord};
pub use util::{load_bench_config, open_history_db};
