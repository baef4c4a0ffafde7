//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! Misuse of a store (enumerating after close, mixing calls between stores)
//! is a programming error and panics instead of producing a `TraceError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the trace store and its decoders
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Trace file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to open trace file {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Failed to read trace: {0}")]
    Read(String),
}

impl TraceError {
    /// Build an `Open` error for the given path
    pub fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TraceError::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Read` error from any displayable cause
    pub fn read(reason: impl ToString) -> Self {
        TraceError::Read(reason.to_string())
    }

    /// True for errors raised mid-enumeration (partial results may exist)
    pub fn is_read_error(&self) -> bool {
        matches!(self, TraceError::Read(_))
    }
}
