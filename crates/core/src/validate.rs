//! Benchmark validator: compare an external slicer's labeling with the
//! computed ground truth.
//!
//! Disagreements are report data, never errors. Only a candidate that does
//! not line up with the chain (unknown or missing functions, wrong statement
//! counts) is rejected, as `MalformedProgram`.
//!
//! A candidate may whitelist statements per function. Whitelisted
//! statements get [`Verdict::Excluded`] and are left out of every count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::CallChain;
use crate::error::{BenchError, BenchResult};
use crate::model::StmtId;
use crate::partition::{partition_chain, ChainLiveSet};

/// Externally supplied labeling: per function, one flag per statement in
/// pre-order (`true` = live).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidateLiveSet {
    pub functions: BTreeMap<String, Vec<bool>>,
    /// Statements left out of the comparison, by function.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub whitelist: BTreeMap<String, Vec<StmtId>>,
}

impl CandidateLiveSet {
    pub fn is_whitelisted(&self, function: &str, id: StmtId) -> bool {
        self.whitelist.get(function).is_some_and(|ids| ids.contains(&id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Match,
    /// Claimed live, actually dead.
    FalseLive,
    /// Claimed dead, actually live.
    FalseDead,
    /// Whitelisted; not compared.
    Excluded,
}

impl Verdict {
    fn of(expected_live: bool, claimed_live: bool) -> Self {
        match (expected_live, claimed_live) {
            (false, true) => Verdict::FalseLive,
            (true, false) => Verdict::FalseDead,
            _ => Verdict::Match,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Match => "match",
            Verdict::FalseLive => "false-live",
            Verdict::FalseDead => "false-dead",
            Verdict::Excluded => "excluded",
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Verdict::FalseLive | Verdict::FalseDead)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementVerdict {
    pub index: StmtId,
    /// One-line rendering of the statement.
    pub statement: String,
    pub expected_live: bool,
    pub claimed_live: bool,
    pub verdict: Verdict,
}

/// Confusion counts over "live" as the positive class, with precision,
/// recall and F1. An empty denominator yields `0.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SliceMetrics {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl SliceMetrics {
    pub fn from_counts(tp: usize, fp: usize, fn_: usize, tn: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            true_negatives: tn,
            precision,
            recall,
            f1_score,
        }
    }

    fn from_verdicts(statements: &[StatementVerdict]) -> Self {
        let (mut tp, mut fp, mut fn_, mut tn) = (0, 0, 0, 0);
        for s in statements.iter().filter(|s| s.verdict != Verdict::Excluded) {
            match (s.expected_live, s.claimed_live) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }
        Self::from_counts(tp, fp, fn_, tn)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionReport {
    pub function: String,
    pub statements: Vec<StatementVerdict>,
    pub metrics: SliceMetrics,
}

impl FunctionReport {
    pub fn count(&self, verdict: Verdict) -> usize {
        self.statements.iter().filter(|s| s.verdict == verdict).count()
    }
}

/// Diff between the ground truth and a candidate, in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub entry: String,
    pub functions: Vec<FunctionReport>,
    pub overall: SliceMetrics,
}

impl ValidationReport {
    pub fn is_full_match(&self) -> bool {
        self.mismatch_count() == 0
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.functions.iter().map(|f| f.count(verdict)).sum()
    }

    pub fn mismatch_count(&self) -> usize {
        self.count(Verdict::FalseLive) + self.count(Verdict::FalseDead)
    }

    pub fn statement_count(&self) -> usize {
        self.functions.iter().map(|f| f.statements.len()).sum()
    }

    /// Every non-matching statement as `(function, verdict)`.
    pub fn mismatches(&self) -> Vec<(&str, &StatementVerdict)> {
        self.functions
            .iter()
            .flat_map(|f| {
                f.statements
                    .iter()
                    .filter(|s| s.verdict.is_mismatch())
                    .map(move |s| (f.function.as_str(), s))
            })
            .collect()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionReport> {
        self.functions.iter().find(|f| f.function == name)
    }
}

/// Validate `candidate` against the chain's computed ground truth.
pub fn validate(chain: &CallChain, candidate: &CandidateLiveSet) -> BenchResult<ValidationReport> {
    let truth = partition_chain(chain);
    validate_against(chain, &truth, candidate)
}

/// Validate `candidate` against an already computed ground truth for `chain`.
pub fn validate_against(
    chain: &CallChain,
    truth: &ChainLiveSet,
    candidate: &CandidateLiveSet,
) -> BenchResult<ValidationReport> {
    if let Some(unknown) = candidate.functions.keys().find(|name| !chain.contains(name)) {
        return Err(BenchError::malformed(
            unknown.as_str(),
            "candidate LiveSet names a function that is not part of the chain",
        ));
    }

    for (name, ids) in &candidate.whitelist {
        let Some(function) = chain.function(name) else {
            return Err(BenchError::malformed(
                name.as_str(),
                "candidate whitelist names a function that is not part of the chain",
            ));
        };
        if let Some(id) = ids.iter().find(|&&id| id >= function.statement_count()) {
            return Err(BenchError::malformed(
                name.as_str(),
                format!(
                    "candidate whitelist names statement {id} but the function has {} statement(s)",
                    function.statement_count()
                ),
            ));
        }
    }

    let mut functions = Vec::with_capacity(chain.functions().len());
    for function in chain.functions() {
        let name = function.name();
        let Some(claimed) = candidate.functions.get(name) else {
            return Err(BenchError::malformed(
                name,
                "candidate LiveSet has no entry for this function",
            ));
        };
        if claimed.len() != function.statement_count() {
            return Err(BenchError::malformed(
                name,
                format!(
                    "candidate LiveSet has {} statement flag(s) but the function has {} statement(s)",
                    claimed.len(),
                    function.statement_count()
                ),
            ));
        }

        let expected = truth.get(name);
        let statements: Vec<StatementVerdict> = function
            .statements()
            .into_iter()
            .map(|stmt| {
                let expected_live = expected.is_some_and(|l| l.is_live(stmt.id()));
                let claimed_live = claimed[stmt.id()];
                let verdict = if candidate.is_whitelisted(name, stmt.id()) {
                    Verdict::Excluded
                } else {
                    Verdict::of(expected_live, claimed_live)
                };
                StatementVerdict {
                    index: stmt.id(),
                    statement: stmt.summary(),
                    expected_live,
                    claimed_live,
                    verdict,
                }
            })
            .collect();
        let metrics = SliceMetrics::from_verdicts(&statements);
        functions.push(FunctionReport { function: name.to_string(), statements, metrics });
    }

    let all: Vec<StatementVerdict> =
        functions.iter().flat_map(|f| f.statements.iter().cloned()).collect();
    let report = ValidationReport {
        entry: chain.entry().to_string(),
        overall: SliceMetrics::from_verdicts(&all),
        functions,
    };

    debug!(
        entry = chain.entry(),
        statements = report.statement_count(),
        mismatches = report.mismatch_count(),
        excluded = report.count(Verdict::Excluded),
        "validated candidate"
    );
    Ok(report)
}
