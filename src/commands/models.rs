use crate::aggregator::AnalysisKind;
use crate::utils::config::DEFAULT_TOP_COUNT;
use std::path::PathBuf;

/// Arguments for the analysis commands
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace file to analyze
    pub trace_file: PathBuf,

    /// How calls are grouped
    pub kind: AnalysisKind,

    /// Number of ranking entries to report
    pub count: usize,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace_file: PathBuf::new(),
            kind: AnalysisKind::Top,
            count: DEFAULT_TOP_COUNT,
        }
    }
}
