use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use slicebench_core::document::chain_name;
use slicebench_core::interp::{Interpreter, DEFAULT_MAX_STEPS};
use slicebench_core::{partition_chain, Function, Stmt};

use crate::canonicalize_or_current;
use crate::commands::{live_mask_string, load_bench_config, load_composed_chain};

#[derive(Debug, Serialize)]
pub struct ChainSummary {
    pub chain: String,
    pub entry: String,
    pub sha256: String,
    pub statements: usize,
    pub live: usize,
    pub functions: Vec<FunctionSummary>,
}

#[derive(Debug, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    pub layer: usize,
    pub params: Vec<String>,
    pub statements: usize,
    pub live: usize,
    pub callees: Vec<String>,
}

/// Compose a chain document and summarize its layering and live counts.
pub fn check_chain_command(path: &str, json: bool) -> Result<()> {
    let (loaded, chain) = load_composed_chain(path)?;
    let truth = partition_chain(&chain);

    let functions: Vec<FunctionSummary> = chain
        .functions()
        .iter()
        .map(|f| FunctionSummary {
            name: f.name().to_string(),
            layer: chain.layer_of(f.name()).unwrap_or(0),
            params: f.params().to_vec(),
            statements: f.statement_count(),
            live: truth.get(f.name()).map_or(0, |l| l.live_count()),
            callees: chain.callees_of(f.name()).into_iter().map(str::to_string).collect(),
        })
        .collect();

    let summary = ChainSummary {
        chain: chain_name(&loaded.path),
        entry: chain.entry().to_string(),
        sha256: loaded.sha256.clone(),
        statements: chain.statement_count(),
        live: truth.live_count(),
        functions,
    };

    if json {
        let serialized = serde_json::to_string_pretty(&summary)
            .context("Failed to serialize chain summary to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Chain: {} (entry: {})", summary.chain, summary.entry);
    println!("  Statements: {} ({} live)", summary.statements, summary.live);
    println!("  Layers:");
    for (depth, names) in chain.layers().iter().enumerate() {
        println!("    {}: {}", depth, names.join(", "));
    }
    println!("  Functions:");
    for f in &summary.functions {
        let callees = if f.callees.is_empty() { "-".to_string() } else { f.callees.join(", ") };
        println!(
            "    - {}({}) statements={} live={} calls: {}",
            f.name,
            f.params.join(", "),
            f.statements,
            f.live,
            callees
        );
    }

    Ok(())
}

/// Print the ground-truth live/dead labeling of a chain.
///
/// The JSON form is a candidate document, so it can be fed straight back
/// into `validate` or checked in as an oracle.
pub fn slice_chain_command(path: &str, json: bool) -> Result<()> {
    let (_loaded, chain) = load_composed_chain(path)?;
    let truth = partition_chain(&chain);

    if json {
        let serialized = serde_json::to_string_pretty(&truth.to_candidate())
            .context("Failed to serialize LiveSet to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("LiveSet for entry `{}`:", chain.entry());
    for function in chain.functions() {
        let flags = truth.get(function.name()).map(|l| l.as_slice().to_vec()).unwrap_or_default();
        println!("{} [{}]", function.name(), live_mask_string(&flags));
        for (depth, stmt) in nested_statements(function) {
            let label = if truth.is_live(function.name(), stmt.id()) { "live" } else { "dead" };
            println!("  {:>3} {} {}{}", stmt.id(), label, "  ".repeat(depth), stmt.summary());
        }
    }

    Ok(())
}

/// Statements in pre-order with their nesting depth.
fn nested_statements(function: &Function) -> Vec<(usize, &Stmt)> {
    fn walk<'a>(block: &'a [Stmt], depth: usize, out: &mut Vec<(usize, &'a Stmt)>) {
        for stmt in block {
            out.push((depth, stmt));
            for nested in stmt.blocks() {
                walk(nested, depth + 1, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(function.body(), 0, &mut out);
    out
}

/// Interpret a chain with integer arguments.
///
/// With `live_only`, statements outside the ground-truth LiveSet are skipped.
/// The step budget comes from `max_steps`, then from the bench config under
/// `root`, then from the built-in default.
pub fn run_chain_command(
    path: &str,
    args: &[i64],
    function: Option<&str>,
    live_only: bool,
    max_steps: Option<u64>,
    root: Option<&str>,
) -> Result<()> {
    let (_loaded, chain) = load_composed_chain(path)?;
    let target = function.unwrap_or(chain.entry()).to_string();
    if !chain.contains(&target) {
        return Err(anyhow!(
            "Function `{}` is not part of the chain rooted at `{}`",
            target,
            chain.entry()
        ));
    }

    let budget = match (max_steps, root) {
        (Some(steps), _) => steps,
        (None, Some(root)) => {
            let layout = slicebench_core::db::BenchLayout::new(canonicalize_or_current(root)?);
            load_bench_config(&layout)?.eval.max_steps
        }
        (None, None) => DEFAULT_MAX_STEPS,
    };

    let truth = partition_chain(&chain);
    let mut interpreter = Interpreter::new(&chain).with_max_steps(budget);
    if live_only {
        interpreter = interpreter.with_mask(&truth);
    }
    let value = interpreter
        .call(&target, args)
        .with_context(|| format!("Failed to evaluate `{target}`"))?;

    let rendered = args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    if live_only {
        println!("{target}({rendered}) = {value} (live statements only)");
    } else {
        println!("{target}({rendered}) = {value}");
    }

    Ok(())
}
