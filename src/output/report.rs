//! Plain-text ranking report.
//!
//! ```text
//!                                       ntdll!RtlpAllocateHeap	2
//!                                        ntdll!RtlAllocateHeap	1
//!
//! 3 events total
//! ```

use crate::aggregator::Ranking;
use crate::utils::config::NAME_COLUMN_WIDTH;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Render the report as a string
///
/// **Public** - used by tests and by `write_report`
pub fn format_report(ranking: &Ranking) -> String {
    let mut out = String::new();

    for item in &ranking.items {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:>width$}\t{}",
            item.key,
            item.call_count,
            width = NAME_COLUMN_WIDTH
        );
    }

    out.push('\n');
    let _ = writeln!(out, "{} events total", ranking.total);

    out
}

/// Write the report to `writer`
pub fn write_report(ranking: &Ranking, mut writer: impl Write) -> io::Result<()> {
    writer.write_all(format_report(ranking).as_bytes())?;
    writer.flush()
}
