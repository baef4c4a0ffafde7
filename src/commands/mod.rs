//! CLI command implementations.
//!
//! Commands orchestrate the store and aggregator to perform user tasks.

pub mod analyze;
pub mod cli;
pub mod models;

// Re-export main command functions
pub use analyze::{execute_analysis, open_store, run_analysis, validate_args};
pub use cli::run_cli;
pub use models::AnalyzeArgs;
