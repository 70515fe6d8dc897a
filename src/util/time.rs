//! Date formatting for Org timestamps.

use chrono::NaiveDateTime;

/// Format of scheduled datetimes in a Nozbe export.
pub const NOZBE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Org active date stamp with abbreviated weekday.
pub const ORG_DATE_FORMAT: &str = "<%Y-%m-%d %a>";

/// Convert `YYYY-MM-DD HH:MM:SS` into an Org date stamp like `<2020-03-05 Thu>`.
///
/// Returns `None` if the value does not match the export format. The weekday
/// always uses English abbreviations.
#[must_use]
pub fn org_date_from_nozbe(value: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(value.trim(), NOZBE_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.format(ORG_DATE_FORMAT).to_string())
}
