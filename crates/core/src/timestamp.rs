//! Canonical sortable timestamp strings
//!
//! Timestamps are persisted as fixed-width UTC strings:
//!
//! ```text
//! YYYY-MM-DDTHH:MM:SS.mmmZ
//! ```
//!
//! Every component is zero-padded and the zone is always `Z`, so for years
//! 0000 through 9999 plain byte-wise string order is chronological order.
//! This is what lets the backend's key ordering and naive string comparison
//! agree with time.
//!
//! ## Precision
//!
//! The canonical form carries milliseconds. Instants with finer precision are
//! truncated by [`truncate_to_millis`]. `Value::timestamp`, `Value`
//! deserialization and the table write path all apply it so in-memory and
//! persisted forms agree.
//!
//! ## Range
//!
//! Only years 0000 through 9999 have a fixed-width form. See
//! [`in_canonical_range`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer};

/// strftime pattern of the canonical form
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Render an instant in canonical sortable form
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use recordkv_core::timestamp::to_canonical;
///
/// let t = Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap();
/// assert_eq!(to_canonical(&t), "2024-01-05T09:30:00.000Z");
/// ```
pub fn to_canonical(t: &DateTime<Utc>) -> String {
    t.format(CANONICAL_FORMAT).to_string()
}

/// Parse a timestamp string
///
/// Accepts, in order:
/// - RFC 3339 with any offset (normalized to UTC)
/// - `YYYY-MM-DDTHH:MM:SS[.fff]` without zone, read as UTC
/// - bare `YYYY-MM-DD`, read as midnight UTC
///
/// Returns `None` when the string is not a valid instant.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// Drop sub-millisecond precision
pub fn truncate_to_millis(t: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = t.nanosecond();
    t.with_nanosecond(nanos - nanos % 1_000_000).unwrap_or(t)
}

/// Whether `t` renders to a fixed-width canonical string
///
/// Outside years 0000-9999 chrono emits a signed, wider year, which neither
/// sorts with the rest nor parses back.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use recordkv_core::timestamp::in_canonical_range;
///
/// assert!(in_canonical_range(&Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap()));
/// assert!(!in_canonical_range(&Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap()));
/// ```
pub fn in_canonical_range(t: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&t.year())
}

/// Deserialize an instant and truncate it to millisecond precision
pub fn deserialize_truncated<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    DateTime::<Utc>::deserialize(deserializer).map(truncate_to_millis)
}
