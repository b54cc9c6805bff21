//! CLI output formatting utilities

use std::io::Write;

use chrono::DateTime;
use chrono::TimeZone;

pub const USAGE: &str = "Usage: searchrag [query]";

/// Print the usage line
pub fn print_usage<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{USAGE}")
}

/// Local timestamp with microsecond precision, e.g. `2025-10-01 09:30:00.123456`
#[must_use]
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Elapsed time as `H:MM:SS[.ffffff]`
#[must_use]
pub fn format_elapsed(duration: chrono::Duration) -> String {
    let micros = duration.num_microseconds().unwrap_or(i64::MAX);
    let sign = if micros < 0 { "-" } else { "" };
    let micros = micros.unsigned_abs();

    let total_secs = micros / 1_000_000;
    let fraction = micros % 1_000_000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if fraction == 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}.{fraction:06}")
    }
}

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}
