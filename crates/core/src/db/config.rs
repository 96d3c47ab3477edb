use serde::{Deserialize, Serialize};

use crate::interp::DEFAULT_MAX_STEPS;

/// Where the validation history database lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Path to the history database file (typically relative to the bench root).
    pub path: String,
}

impl HistoryConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Settings for the reference interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Statement budget per top-level invocation.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

fn default_max_steps() -> u64 {
    DEFAULT_MAX_STEPS
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { max_steps: DEFAULT_MAX_STEPS }
    }
}

/// Serializable configuration describing a bench root.
///
/// This lives at `.slicebench/config.json` in the bench root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Human-friendly bench name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Config format version.
    pub config_version: String,
    /// History database configuration.
    pub history: HistoryConfig,
    #[serde(default)]
    pub eval: EvalConfig,
}

impl BenchConfig {
    pub fn new(name: impl Into<String>, history_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            history: HistoryConfig::new(history_path),
            eval: EvalConfig::default(),
        }
    }
}
