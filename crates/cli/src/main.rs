use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use slicebench::commands::{
    bench_info_command, check_chain_command, history_command, init_bench_command,
    run_chain_command, slice_chain_command, validate_command, RecordOptions,
};
use tracing_subscriber::EnvFilter;

/// Layered dataflow slicing benchmark CLI.
///
/// This CLI is a thin wrapper around `slicebench-core` (exposed in code as
/// `slicebench_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "slicebench",
    version,
    about = "Ground-truth live/dead slicing benchmarks",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a bench root: `.slicebench/config.json`, the history database
    /// and a `reports` directory.
    Init {
        /// Bench root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional bench name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the config and layout status of a bench root.
    Info {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compose a chain document and summarize its layers and live counts.
    Check {
        /// Chain document (YAML, or JSON for `.json`).
        chain: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the ground-truth LiveSet of a chain. `--json` output is a valid
    /// candidate document.
    Slice {
        chain: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Interpret a chain with integer arguments.
    Run {
        chain: String,

        /// Integer argument; repeat in parameter order, e.g. `--arg 3 --arg -4`.
        #[arg(long = "arg", allow_negative_numbers = true)]
        args: Vec<i64>,

        /// Function to call instead of the entry.
        #[arg(long)]
        function: Option<String>,

        /// Execute only the statements of the ground-truth LiveSet.
        #[arg(long, default_value_t = false)]
        live_only: bool,

        /// Statement budget; defaults to the bench config under `--root`, if given.
        #[arg(long)]
        max_steps: Option<u64>,

        #[arg(long)]
        root: Option<String>,
    },

    /// Score a candidate LiveSet against a chain's ground truth.
    ///
    /// Exit code 0 on a full match, 1 on any mismatch, 2 on malformed input.
    Validate {
        chain: String,

        candidate: String,

        #[arg(long, default_value_t = false)]
        json: bool,

        /// Store the run in the bench root's history database.
        #[arg(long, default_value_t = false)]
        record: bool,

        /// Bench root used by `--record`.
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// List recorded validation runs.
    History {
        #[arg(long, default_value = ".")]
        root: String,

        /// Only show runs for this chain name.
        #[arg(long)]
        chain: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// The candidate disagrees with the ground truth somewhere.
const EXIT_MISMATCH: u8 = 1;
/// Malformed input, IO failures and every other error.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_MISMATCH),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one command. `Ok(false)` means "completed, but report a mismatch".
fn dispatch(command: Command) -> Result<bool> {
    match command {
        Command::Init { root, name } => init_bench_command(&root, name)?,
        Command::Info { root, json } => bench_info_command(&root, json)?,
        Command::Check { chain, json } => check_chain_command(&chain, json)?,
        Command::Slice { chain, json } => slice_chain_command(&chain, json)?,
        Command::Run { chain, args, function, live_only, max_steps, root } => {
            run_chain_command(
                &chain,
                &args,
                function.as_deref(),
                live_only,
                max_steps,
                root.as_deref(),
            )?
        }
        Command::Validate { chain, candidate, json, record, root } => {
            return validate_command(&chain, &candidate, json, &RecordOptions { record, root });
        }
        Command::History { root, chain, json } => history_command(&root, chain.as_deref(), json)?,
    }

    Ok(true)
}
