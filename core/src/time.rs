//! Time related utils.
//!
//! All formatting happens on [`chrono::Utc`] values, so output never depends
//! on the host timezone or locale.

use chrono::TimeZone;
use chrono::Utc;

use crate::Error;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220313`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO 8601 basic format: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse time from ISO 8601 basic format: `20220313T072004Z`
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    let t = chrono::NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ").map_err(|e| {
        Error::request_invalid(format!("invalid iso8601 timestamp {s:?}")).with_source(e)
    })?;
    Ok(Utc.from_utc_datetime(&t))
}
