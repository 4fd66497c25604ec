//! History Controller.
//!
//! Loads pages of browsing history from the remote data service, groups each
//! page by calendar date and applies deletions to the local copy without
//! re-fetching.
//!
//! State lives behind a `Mutex` that is never held across an `.await`, so
//! several requests may be in flight at once. Every load is tagged with a
//! sequence number and only the response to the most recent one is applied.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::controllers::grouping::{group_by_date, group_by_date_in};
use crate::controllers::pagination;
use crate::services::remote_data_service::RemoteDataService;
use crate::types::errors::HistoryError;
use crate::types::history::{DateGroups, HistoryEntry};
use crate::types::page::{LoadOutcome, LoadStatus, PageItem, PageQuery, PageState};

/// Point-in-time copy of the controller state, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub status: LoadStatus,
    pub page: PageState<HistoryEntry>,
    pub groups: DateGroups,
    pub deleting_date: Option<NaiveDate>,
}

struct HistoryState {
    status: LoadStatus,
    page: PageState<HistoryEntry>,
    groups: DateGroups,
    deleting_date: Option<NaiveDate>,
    /// Page and filter of the most recently issued load.
    requested: (u32, Option<NaiveDate>),
    latest_request: u64,
}

impl HistoryState {
    fn initial() -> Self {
        Self {
            status: LoadStatus::Loading,
            page: PageState::initial(),
            groups: DateGroups::new(),
            deleting_date: None,
            requested: (1, None),
            latest_request: 0,
        }
    }
}

/// Controller behind the history view.
pub struct HistoryController {
    service: Arc<dyn RemoteDataService>,
    page_size: u32,
    /// Zone used for date grouping; `None` means the local zone.
    time_zone: Option<FixedOffset>,
    state: Mutex<HistoryState>,
}

impl HistoryController {
    pub fn new(service: Arc<dyn RemoteDataService>, page_size: u32) -> Self {
        Self {
            service,
            page_size: page_size.max(1),
            time_zone: None,
            state: Mutex::new(HistoryState::initial()),
        }
    }

    /// Groups by calendar date at a fixed UTC offset instead of the local zone.
    pub fn with_time_zone(mut self, offset: FixedOffset) -> Self {
        self.time_zone = Some(offset);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn state(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn group(&self, entries: &[HistoryEntry]) -> DateGroups {
        match &self.time_zone {
            Some(offset) => group_by_date_in(entries, offset),
            None => group_by_date(entries),
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        let state = self.state();
        HistorySnapshot {
            status: state.status.clone(),
            page: state.page.clone(),
            groups: state.groups.clone(),
            deleting_date: state.deleting_date,
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.state().status.clone()
    }

    pub fn current_page(&self) -> u32 {
        self.state().page.current_page
    }

    pub fn filter_date(&self) -> Option<NaiveDate> {
        self.state().page.filter_date
    }

    /// Whether a bulk delete for `date` is in flight.
    pub fn is_deleting(&self, date: NaiveDate) -> bool {
        self.state().deleting_date == Some(date)
    }

    /// The numbered pagination row; the history view lists every page.
    pub fn page_numbers(&self) -> Vec<PageItem> {
        pagination::all_pages(self.state().page.total_pages)
    }

    /// Resets to a freshly mounted view and loads the first unfiltered page.
    pub async fn mount(&self) -> Result<LoadOutcome, HistoryError> {
        {
            let mut state = self.state();
            let latest_request = state.latest_request;
            *state = HistoryState {
                latest_request,
                ..HistoryState::initial()
            };
        }
        self.load(1, None).await
    }

    /// Fetches `page` restricted to `filter_date` and replaces the page state.
    ///
    /// On failure the controller enters its error state and stays there until
    /// the next navigation. A response that arrives after a newer load was
    /// issued is dropped and reported as [`LoadOutcome::Superseded`]. If the
    /// result set shrank below `page`, the last page that still exists is
    /// fetched instead.
    pub async fn load(
        &self,
        page: u32,
        filter_date: Option<NaiveDate>,
    ) -> Result<LoadOutcome, HistoryError> {
        let mut page = page;
        loop {
            let request = {
                let mut state = self.state();
                state.latest_request += 1;
                state.status = LoadStatus::Loading;
                state.requested = (page, filter_date);
                state.page.filter_date = filter_date;
                state.latest_request
            };

            log::debug!(
                "Loading history page {} (filter: {:?}, request #{})",
                page,
                filter_date,
                request
            );
            let query = PageQuery::new(page, self.page_size, filter_date);
            let result = self.service.list_history(&query).await;

            let mut state = self.state();
            if state.latest_request != request {
                log::debug!(
                    "Discarding history response #{} (latest is #{})",
                    request,
                    state.latest_request
                );
                return Ok(LoadOutcome::Superseded);
            }

            let response = match result {
                Ok(response) => response,
                Err(source) => {
                    let err = HistoryError::Load { page, source };
                    log::error!("{}", err);
                    state.status = LoadStatus::Error(err.user_message().to_string());
                    return Err(err);
                }
            };

            let last_page = response.total_pages.max(1);
            if page > last_page {
                log::debug!(
                    "History page {} no longer exists, loading page {}",
                    page,
                    last_page
                );
                drop(state);
                page = last_page;
                continue;
            }

            state.groups = self.group(&response.history);
            state.page = PageState::from_response(
                response.current_page,
                response.total_pages,
                response.total_count,
                filter_date,
                response.history,
            );
            state.status = LoadStatus::Ready;
            log::debug!(
                "History page {}/{} loaded: {} entries in {} dates",
                state.page.current_page,
                state.page.total_pages,
                state.page.items.len(),
                state.groups.len()
            );
            return Ok(LoadOutcome::Applied);
        }
    }

    /// Navigates to `page` under the current filter; out-of-range pages are ignored.
    pub async fn change_page(&self, page: u32) -> Result<LoadOutcome, HistoryError> {
        let (total_pages, filter_date) = {
            let state = self.state();
            (state.page.total_pages, state.requested.1)
        };
        if !pagination::in_bounds(page, total_pages) {
            log::debug!("Ignoring history page {} (1..={})", page, total_pages);
            return Ok(LoadOutcome::OutOfRange);
        }
        self.load(page, filter_date).await
    }

    pub async fn next_page(&self) -> Result<LoadOutcome, HistoryError> {
        let current = self.current_page();
        self.change_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> Result<LoadOutcome, HistoryError> {
        let current = self.current_page();
        self.change_page(current.saturating_sub(1)).await
    }

    /// Restricts the view to `date`, starting again from page 1.
    pub async fn set_filter(&self, date: NaiveDate) -> Result<LoadOutcome, HistoryError> {
        self.load(1, Some(date)).await
    }

    /// Drops the date restriction, starting again from page 1.
    pub async fn clear_filter(&self) -> Result<LoadOutcome, HistoryError> {
        self.load(1, None).await
    }

    /// Deletes one entry shown under `date`.
    ///
    /// On success the entry leaves its date group (and the group disappears
    /// once empty) and `total_count` drops by one. On failure nothing changes.
    /// Returns whether the entry was present locally.
    pub async fn delete_item(&self, id: &str, date: NaiveDate) -> Result<bool, HistoryError> {
        if let Err(source) = self.service.delete_history_entry(id).await {
            let err = HistoryError::DeleteItem {
                id: id.to_string(),
                source,
            };
            log::warn!("{}", err);
            return Err(err);
        }

        let mut state = self.state();
        let mut grouped = state.groups.remove_entry(date, id).is_some();
        if !grouped {
            // The caller's date may come from a different zone than ours.
            grouped = state.groups.remove_id(id).is_some();
        }
        let before = state.page.items.len();
        state.page.items.retain(|e| e.id != id);
        let present = grouped || state.page.items.len() != before;
        if present {
            state.page.total_count = state.page.total_count.saturating_sub(1);
        }

        log::info!("Deleted history entry {}", id);
        Ok(present)
    }

    /// Deletes every entry of `date` on the server and drops its group.
    ///
    /// `total_count` is reduced by the size of the dropped group but
    /// `total_pages` is not recomputed until the next navigation.
    /// Returns the number of entries removed locally.
    pub async fn delete_all_for_date(&self, date: NaiveDate) -> Result<usize, HistoryError> {
        self.state().deleting_date = Some(date);

        let result = self.service.delete_history_for_date(date).await;

        let mut state = self.state();
        if state.deleting_date == Some(date) {
            state.deleting_date = None;
        }

        if let Err(source) = result {
            let err = HistoryError::DeleteDate { date, source };
            log::warn!("{}", err);
            return Err(err);
        }

        let removed = match state.groups.remove_group(date) {
            Some(group) => {
                let ids: HashSet<String> = group.entries.into_iter().map(|e| e.id).collect();
                state.page.items.retain(|e| !ids.contains(&e.id));
                ids.len()
            }
            None => 0,
        };
        state.page.total_count = state.page.total_count.saturating_sub(removed as u64);

        log::info!("All history for {} has been deleted ({} shown entries)", date, removed);
        Ok(removed)
    }
}
