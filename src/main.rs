//! trcan - function boundary trace analysis CLI
//!
//! Ranks the most called routines, or routine name prefixes, of a trace.

use std::process::ExitCode;

use fbt_trace_analysis::commands::run_cli;

fn main() -> ExitCode {
    ExitCode::from(run_cli(std::env::args_os(), std::io::stdout()))
}
