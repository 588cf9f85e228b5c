use std::fmt::Write;

use crate::render::{format_datetime, DisplayConfig};
use crate::sample::Sample;

pub const CSV_HEADER: &str = "Timestamp,Value";

/// Render samples as CSV with timestamps in the display offset.
pub fn export_csv(samples: &[Sample], cfg: &DisplayConfig) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + samples.len() * 32);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for s in samples {
        // writing to a String cannot fail
        let _ = writeln!(out, "{},{}", format_datetime(s.time, cfg), s.value);
    }
    out
}
