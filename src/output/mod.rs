//! Output writers for analysis results.
//!
//! Rankings are reported as plain text on standard output; nothing is
//! written to disk.

pub mod report;

// Re-export main functions
pub use report::{format_report, write_report};
