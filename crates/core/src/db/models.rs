use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationReport;

/// Outcome of one validation run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Match,
    Mismatch,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Match => "match",
            RunStatus::Mismatch => "mismatch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "match" => Some(RunStatus::Match),
            "mismatch" => Some(RunStatus::Mismatch),
            _ => None,
        }
    }
}

/// Record describing one validation run, as stored in the history database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationRunRecord {
    /// Chain name (file stem of the chain document).
    pub chain: String,
    pub chain_hash: String,
    pub candidate_hash: String,
    pub entry: String,
    pub statements: usize,
    pub matches: usize,
    pub false_live: usize,
    pub false_dead: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub status: RunStatus,
    /// RFC 3339 timestamp.
    pub recorded_at: String,
}

impl ValidationRunRecord {
    /// Summarize a report for storage.
    pub fn from_report(
        chain: impl Into<String>,
        chain_hash: impl Into<String>,
        candidate_hash: impl Into<String>,
        report: &ValidationReport,
        recorded_at: impl Into<String>,
    ) -> Self {
        use crate::validate::Verdict;

        Self {
            chain: chain.into(),
            chain_hash: chain_hash.into(),
            candidate_hash: candidate_hash.into(),
            entry: report.entry.clone(),
            statements: report.statement_count(),
            matches: report.count(Verdict::Match),
            false_live: report.count(Verdict::FalseLive),
            false_dead: report.count(Verdict::FalseDead),
            precision: report.overall.precision,
            recall: report.overall.recall,
            f1_score: report.overall.f1_score,
            status: if report.is_full_match() { RunStatus::Match } else { RunStatus::Mismatch },
            recorded_at: recorded_at.into(),
        }
    }
}

/// Current UTC time as RFC 3339, the format stored in `recorded_at`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC time in a form safe for file names (`20261019T101500Z`).
pub fn file_stamp_now() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}
