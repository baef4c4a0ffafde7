//! Command line front end for `trcan`.
//!
//! Everything the binary does lives here so the exit-code contract can be
//! exercised without spawning a process: usage problems, a missing file and
//! any analysis error print a message on the given writer and yield 1.

use super::analyze::{open_store, run_analysis, validate_args};
use super::models::AnalyzeArgs;
use crate::aggregator::AnalysisKind;
use crate::output::write_report;
use crate::utils::config::DEFAULT_TOP_COUNT;
use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

/// Function boundary trace analysis
#[derive(Parser, Debug)]
#[command(name = "trcan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Analysis to run
    #[arg(value_enum)]
    command: Command,

    /// Trace file to analyze
    file: PathBuf,

    /// Number of ranking entries to print
    #[arg(short, long, default_value_t = DEFAULT_TOP_COUNT)]
    count: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Available commands
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Command {
    /// Most called routines, as Module!Function
    Top,
    /// Most called function name prefixes
    Prefix,
}

impl From<Command> for AnalysisKind {
    fn from(command: Command) -> Self {
        match command {
            Command::Top => AnalysisKind::Top,
            Command::Prefix => AnalysisKind::Prefix,
        }
    }
}

/// Parse `args` (program name first), run the command and return the exit code
///
/// **Public** - the whole CLI; `main` only forwards the process arguments
///
/// Progress, the report and error messages all go to `out`.
/// Returns 0 on success (including `--help`/`--version`), 1 otherwise.
pub fn run_cli<I, T>(args: I, mut out: impl Write) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            // Nothing left to report to if the writer itself fails
            let _ = writeln!(out, "{}", e);
            return code;
        }
    };

    init_logging(cli.verbose);

    match run(cli, &mut out) {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(out, "{:#}", e);
            1
        }
    }
}

/// Route `log` output to stderr; later calls keep the first logger
fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).try_init();
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let args = AnalyzeArgs {
        trace_file: cli.file,
        kind: cli.command.into(),
        count: cli.count,
    };

    validate_args(&args)?;

    if !args.trace_file.exists() {
        anyhow::bail!("File not found: {}", args.trace_file.display());
    }

    write!(out, "Loading file...")?;
    out.flush()?;
    let mut store = open_store(&args.trace_file)?;
    writeln!(out, "done.")?;

    let ranking = run_analysis(&store, args.kind, args.count)?;
    store.close()?;

    write_report(&ranking, &mut *out)?;

    Ok(())
}
