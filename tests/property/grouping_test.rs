//! Property-based tests for date grouping of history pages.
//!
//! Grouping keeps every entry exactly once, places each entry under its own
//! calendar date, preserves per-date order, and is idempotent: regrouping
//! the flattened groups yields the same groups.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use history_viewer::controllers::grouping::group_by_date_in;
use history_viewer::types::history::HistoryEntry;
use proptest::prelude::*;

/// Timestamps spread over roughly ten days of May 2024.
fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..864_000).prop_map(|secs| Utc.timestamp_opt(1_714_521_600 + secs, 0).unwrap())
}

fn arb_entries() -> impl Strategy<Value = Vec<HistoryEntry>> {
    prop::collection::vec(arb_timestamp(), 0..60).prop_map(|mut stamps| {
        stamps.sort_by(|a, b| b.cmp(a));
        stamps
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| HistoryEntry {
                id: format!("entry-{}", i),
                url: format!("https://site{}.test/", i % 7),
                timestamp,
            })
            .collect()
    })
}

fn arb_offset() -> impl Strategy<Value = FixedOffset> {
    (-12i32..=14).prop_map(|hours| FixedOffset::east_opt(hours * 3600).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_every_entry_lands_under_its_date(entries in arb_entries(), offset in arb_offset()) {
        let groups = group_by_date_in(&entries, &offset);

        prop_assert_eq!(groups.entry_count(), entries.len());
        for group in groups.iter() {
            prop_assert!(!group.entries.is_empty());
            for entry in &group.entries {
                prop_assert_eq!(entry.timestamp.with_timezone(&offset).date_naive(), group.date);
            }
        }

        let mut dates = groups.dates();
        let count = dates.len();
        dates.dedup();
        prop_assert_eq!(dates.len(), count, "a date appears in two groups");
    }

    #[test]
    fn prop_order_within_date_is_preserved(entries in arb_entries(), offset in arb_offset()) {
        let groups = group_by_date_in(&entries, &offset);
        for group in groups.iter() {
            let expected: Vec<&str> = entries
                .iter()
                .filter(|e| e.timestamp.with_timezone(&offset).date_naive() == group.date)
                .map(|e| e.id.as_str())
                .collect();
            let actual: Vec<&str> = group.entries.iter().map(|e| e.id.as_str()).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prop_regrouping_is_idempotent(entries in arb_entries(), offset in arb_offset()) {
        let groups = group_by_date_in(&entries, &offset);
        let flattened: Vec<HistoryEntry> = groups
            .iter()
            .flat_map(|g| g.entries.iter().cloned())
            .collect();

        prop_assert_eq!(group_by_date_in(&flattened, &offset), groups);
    }
}
