//! ISO-8601 log timestamps
//!
//! Format: `YYYY-MM-DDTHH:MM:SS` followed by `Z` for a zero offset, or
//! `+HH:00` / `-HH:00` otherwise. The printed wall-clock time already has
//! the offset applied.

use core::fmt::Write;

use heapless::String;

use super::DateTime;
use crate::config::UtcOffset;

/// Longest timestamp: `2024-01-01T07:00:00+07:00`
pub const TIMESTAMP_LEN: usize = 25;

/// Formatted timestamp text
pub type Timestamp = String<TIMESTAMP_LEN>;

/// Format a UTC clock reading as a local ISO-8601 timestamp
///
/// Returns `None` if applying the offset leaves the representable range.
pub fn format_timestamp(utc: &DateTime, offset: UtcOffset) -> Option<Timestamp> {
    let local = utc.checked_add_seconds(offset.seconds())?;

    let mut out = Timestamp::new();
    write!(
        out,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        local.hour(),
        local.minute(),
        local.second()
    )
    .ok()?;

    if offset.is_utc() {
        out.push('Z').ok()?;
    } else {
        let sign = if offset.hours() > 0 { '+' } else { '-' };
        write!(out, "{}{:02}:00", sign, offset.hours().unsigned_abs()).ok()?;
    }

    Some(out)
}
