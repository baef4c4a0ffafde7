//! Configuration and constants for the CLI.

/// Number of ranking entries printed when `--count` is not given
pub const DEFAULT_TOP_COUNT: usize = 100;

/// Upper bound accepted for `--count`
pub const MAX_TOP_COUNT: usize = 10_000;

/// Width of the right-justified name column in the text report
pub const NAME_COLUMN_WIDTH: usize = 60;

/// Resolved symbol names are bounded, like the fixed-size buffer the
/// native symbol lookup fills in. Longer names are cut to this many chars.
pub const MAX_FUNCTION_NAME_LEN: usize = 64;

/// Major version of the JSON trace format this reader understands
pub const TRACE_FORMAT_MAJOR: u32 = 1;

/// Separator between module and function in qualified names
pub const MODULE_SEPARATOR: char = '!';
