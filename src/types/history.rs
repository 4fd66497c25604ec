use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single visited page as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// One page of history as returned by `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub history: Vec<HistoryEntry>,
    pub total_pages: u32,
    pub total_count: u64,
    pub current_page: u32,
}

/// History entries sharing one calendar date, in server order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub entries: Vec<HistoryEntry>,
}

/// Date groups ordered by the first appearance of each date in the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DateGroups {
    groups: Vec<DateGroup>,
}

impl DateGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` to the group for `date`, opening a new group at the end if needed.
    pub fn push(&mut self, date: NaiveDate, entry: HistoryEntry) {
        match self.groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.entries.push(entry),
            None => self.groups.push(DateGroup {
                date,
                entries: vec![entry],
            }),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DateGroup> {
        self.groups.iter().find(|g| g.date == date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    /// Dates in display order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.groups.iter().map(|g| g.date).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateGroup> {
        self.groups.iter()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of entries across all groups.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// Removes the entry `id` from the group for `date`.
    ///
    /// The group itself is dropped once it has no entries left. Returns the
    /// removed entry, or `None` if the group or the entry was not present.
    pub fn remove_entry(&mut self, date: NaiveDate, id: &str) -> Option<HistoryEntry> {
        let group_index = self.groups.iter().position(|g| g.date == date)?;
        let group = &mut self.groups[group_index];
        let entry_index = group.entries.iter().position(|e| e.id == id)?;
        let removed = group.entries.remove(entry_index);
        if group.entries.is_empty() {
            self.groups.remove(group_index);
        }
        Some(removed)
    }

    /// Removes the entry `id` from whichever group holds it.
    pub fn remove_id(&mut self, id: &str) -> Option<HistoryEntry> {
        let date = self
            .groups
            .iter()
            .find(|g| g.entries.iter().any(|e| e.id == id))?
            .date;
        self.remove_entry(date, id)
    }

    /// Removes the whole group for `date`.
    pub fn remove_group(&mut self, date: NaiveDate) -> Option<DateGroup> {
        let index = self.groups.iter().position(|g| g.date == date)?;
        Some(self.groups.remove(index))
    }
}
