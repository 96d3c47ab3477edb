use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use slicebench_core::db::{file_stamp_now, timestamp_now, BenchContext, ValidationRunRecord};
use slicebench_core::document::{chain_name, load_candidate};
use slicebench_core::{validate, ValidationReport, Verdict};
use tracing::info;

use crate::canonicalize_or_current;
use crate::commands::load_composed_chain;

/// JSON envelope printed by `validate --json`.
#[derive(Debug, Serialize)]
pub struct ValidationOutput<'a> {
    pub chain: String,
    pub chain_sha256: String,
    pub candidate_sha256: String,
    pub full_match: bool,
    pub report: &'a ValidationReport,
}

/// Options for recording a run in a bench root's history.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub record: bool,
    pub root: String,
}

/// Validate a candidate LiveSet against a chain's ground truth.
///
/// Returns `Ok(true)` on a full match and `Ok(false)` on any mismatch.
/// Unreadable documents and structural errors come back as `Err`.
pub fn validate_command(
    chain_path: &str,
    candidate_path: &str,
    json: bool,
    record: &RecordOptions,
) -> Result<bool> {
    let (loaded_chain, chain) = load_composed_chain(chain_path)?;
    let loaded_candidate = load_candidate(Path::new(candidate_path))?;

    let report = validate(&chain, &loaded_candidate.document)
        .with_context(|| format!("Candidate LiveSet {candidate_path} does not fit the chain"))?;
    let name = chain_name(&loaded_chain.path);
    let full_match = report.is_full_match();

    if json {
        let output = ValidationOutput {
            chain: name.clone(),
            chain_sha256: loaded_chain.sha256.clone(),
            candidate_sha256: loaded_candidate.sha256.clone(),
            full_match,
            report: &report,
        };
        let serialized = serde_json::to_string_pretty(&output)
            .context("Failed to serialize validation report to JSON")?;
        println!("{}", serialized);
    } else {
        print_report(&name, &report);
    }

    if record.record {
        let run = ValidationRunRecord::from_report(
            &name,
            &loaded_chain.sha256,
            &loaded_candidate.sha256,
            &report,
            timestamp_now(),
        );
        let (id, report_path) = record_run(&record.root, &run, &report)?;
        info!(id, chain = %name, "recorded validation run");
        if !json {
            println!("Recorded run #{} ({})", id, report_path.display());
        }
    }

    Ok(full_match)
}

fn print_report(name: &str, report: &ValidationReport) {
    let verdict = if report.is_full_match() { "MATCH" } else { "MISMATCH" };
    println!("Validation of `{}` (entry: {}): {}", name, report.entry, verdict);
    println!(
        "  Statements: {}  matches: {}  false-live: {}  false-dead: {}",
        report.statement_count(),
        report.count(Verdict::Match),
        report.count(Verdict::FalseLive),
        report.count(Verdict::FalseDead)
    );
    let excluded = report.count(Verdict::Excluded);
    if excluded > 0 {
        println!("  Whitelisted (not compared): {excluded}");
    }
    println!(
        "  Precision: {:.3}  Recall: {:.3}  F1: {:.3}",
        report.overall.precision, report.overall.recall, report.overall.f1_score
    );

    let mismatches = report.mismatches();
    if mismatches.is_empty() {
        return;
    }
    println!("Mismatches:");
    for (function, stmt) in mismatches {
        println!(
            "  - {}#{} [{}] expected {}, claimed {}: {}",
            function,
            stmt.index,
            stmt.verdict.as_str(),
            live_word(stmt.expected_live),
            live_word(stmt.claimed_live),
            stmt.statement
        );
    }
}

fn live_word(live: bool) -> &'static str {
    if live {
        "live"
    } else {
        "dead"
    }
}

/// Insert the run into the history DB and save the full report under `reports/`.
fn record_run(
    root: &str,
    run: &ValidationRunRecord,
    report: &ValidationReport,
) -> Result<(i64, std::path::PathBuf)> {
    let ctx = BenchContext::from_root(canonicalize_or_current(root)?)?;
    let id = ctx.db.insert_run(run).context("Failed to insert validation run")?;

    fs::create_dir_all(&ctx.layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", ctx.layout.reports_dir.display())
    })?;
    let report_path = ctx.layout.report_path(&run.chain, &format!("{}-{id}", file_stamp_now()));
    let serialized =
        serde_json::to_string_pretty(report).context("Failed to serialize validation report")?;
    fs::write(&report_path, serialized)
        .with_context(|| format!("Failed to write report at {}", report_path.display()))?;

    Ok((id, report_path))
}
