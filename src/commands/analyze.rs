//! `top` and `prefix` command implementation.
//!
//! Both commands:
//! 1. Open the trace store
//! 2. Walk every client's call forest, counting calls per key
//! 3. Rank the keys and report the top entries

use super::models::AnalyzeArgs;
use crate::aggregator::{build_histogram, rank, AnalysisKind, Ranking, Tally};
use crate::store::TraceStore;
use crate::utils::config::MAX_TOP_COUNT;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

/// Open the trace file named on the command line
///
/// **Public** - split from `run_analysis` so the CLI can report progress
pub fn open_store(path: &Path) -> Result<TraceStore> {
    let store = TraceStore::open(path)?;
    debug!("Opened {} as store {}", path.display(), store.id());
    Ok(store)
}

/// Count and rank every call in an open store
///
/// **Public** - the analysis itself, independent of how the store was opened
///
/// # Errors
/// Any enumeration failure. Counts gathered before the failure are logged
/// but no ranking is returned for an incomplete pass.
pub fn run_analysis(store: &TraceStore, kind: AnalysisKind, count: usize) -> Result<Ranking> {
    let start_time = Instant::now();
    let mut tally = Tally::new();

    info!("Step 1/2: Building histogram ({:?})...", kind);
    if let Err(e) = build_histogram(store, |call| kind.key(call), &mut tally) {
        warn!(
            "Analysis aborted after {} calls ({} distinct keys)",
            tally.total(),
            tally.distinct()
        );
        return Err(e).context("Failed to read call tree");
    }

    info!("Step 2/2: Ranking top {} of {} keys...", count, tally.distinct());
    let ranking = rank(&tally, count);

    info!(
        "Top {} entries cover {:.1}% of {} calls",
        ranking.len(),
        ranking.coverage_percentage(),
        ranking.total
    );
    info!("Analysis completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(ranking)
}

/// Execute an analysis command end to end
///
/// **Public** - main entry point for library callers and tests
///
/// # Example
/// ```ignore
/// let args = AnalyzeArgs {
///     trace_file: PathBuf::from("trace.json"),
///     kind: AnalysisKind::Prefix,
///     count: 20,
/// };
/// let ranking = execute_analysis(&args)?;
/// ```
pub fn execute_analysis(args: &AnalyzeArgs) -> Result<Ranking> {
    validate_args(args)?;

    let mut store = open_store(&args.trace_file)?;
    let ranking = run_analysis(&store, args.kind, args.count)?;
    store.close().context("Failed to close trace store")?;

    Ok(ranking)
}

/// Validate analysis arguments
///
/// **Public** - can be called before opening the store for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace_file.as_os_str().is_empty() {
        anyhow::bail!("Trace file path cannot be empty");
    }

    if args.count == 0 {
        anyhow::bail!("count must be greater than 0");
    }

    if args.count > MAX_TOP_COUNT {
        anyhow::bail!("count is too large (max {})", MAX_TOP_COUNT);
    }

    Ok(())
}
