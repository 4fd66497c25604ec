//! Bucketing history entries by calendar date.

use chrono::{Local, TimeZone};

use crate::types::history::{DateGroups, HistoryEntry};

/// Groups entries by their calendar date in `tz`.
///
/// Dates appear in order of first occurrence and entries keep their input
/// order within each date.
pub fn group_by_date_in<Tz: TimeZone>(entries: &[HistoryEntry], tz: &Tz) -> DateGroups {
    let mut groups = DateGroups::new();
    for entry in entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();
        groups.push(date, entry.clone());
    }
    groups
}

/// Groups entries by their calendar date in the local time zone.
pub fn group_by_date(entries: &[HistoryEntry]) -> DateGroups {
    group_by_date_in(entries, &Local)
}
