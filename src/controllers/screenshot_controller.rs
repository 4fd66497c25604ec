//! Screenshot Controller.
//!
//! Flat, paginated list of screenshots with a manual refresh, per-item and
//! per-date deletion, and a full-screen cursor over the current page.
//!
//! Like the history controller, state sits behind a `Mutex` that is released
//! before every `.await`, and only the most recently issued load is applied.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;

use crate::controllers::pagination;
use crate::services::remote_data_service::RemoteDataService;
use crate::types::errors::ScreenshotError;
use crate::types::page::{LoadOutcome, LoadStatus, PageItem, PageQuery, PageState};
use crate::types::screenshot::ScreenshotEntry;

/// Asks the user to approve a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A confirmation answered before the call, e.g. by a front end dialog.
#[derive(Debug, Clone, Copy)]
pub struct Preconfirmed(pub bool);

impl Confirm for Preconfirmed {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Result of a bulk delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkDelete {
    /// No date was selected, nothing was sent.
    NoDate,
    /// The user declined the confirmation, nothing was sent.
    Cancelled,
    /// The server deleted the date; the view was reset to page 1.
    Deleted,
}

/// Point-in-time copy of the controller state, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenshotSnapshot {
    pub status: LoadStatus,
    pub page: PageState<ScreenshotEntry>,
    pub refreshing: bool,
    pub deleting_all: bool,
    pub deleting_id: Option<String>,
    pub fullscreen: Option<usize>,
}

struct ScreenshotState {
    status: LoadStatus,
    page: PageState<ScreenshotEntry>,
    deleting_all: bool,
    deleting_id: Option<String>,
    fullscreen: Option<usize>,
    /// Page and filter of the most recently issued load.
    requested: (u32, Option<NaiveDate>),
    /// Reloads currently in flight.
    refreshes: usize,
    latest_request: u64,
}

impl ScreenshotState {
    fn initial() -> Self {
        Self {
            status: LoadStatus::Loading,
            page: PageState::initial(),
            deleting_all: false,
            deleting_id: None,
            fullscreen: None,
            requested: (1, None),
            refreshes: 0,
            latest_request: 0,
        }
    }
}

/// Where the full-screen cursor goes after the item at `removed` is deleted
/// from a page that now holds `remaining` items.
///
/// Deleting the shown item keeps the index when a later item slides into
/// it, steps back when the last item was shown, and closes the view when
/// nothing is left. Deleting an earlier item keeps the same image shown.
pub fn cursor_after_removal(
    cursor: Option<usize>,
    removed: usize,
    remaining: usize,
) -> Option<usize> {
    let index = cursor?;
    if remaining == 0 {
        return None;
    }
    match removed.cmp(&index) {
        Ordering::Less => Some(index - 1),
        Ordering::Equal if index < remaining => Some(index),
        Ordering::Equal => Some(index - 1),
        Ordering::Greater => Some(index.min(remaining - 1)),
    }
}

/// Controller behind the screenshot view.
pub struct ScreenshotController {
    service: Arc<dyn RemoteDataService>,
    page_size: u32,
    state: Mutex<ScreenshotState>,
}

impl ScreenshotController {
    pub fn new(service: Arc<dyn RemoteDataService>, page_size: u32) -> Self {
        Self {
            service,
            page_size: page_size.max(1),
            state: Mutex::new(ScreenshotState::initial()),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn state(&self) -> MutexGuard<'_, ScreenshotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ScreenshotSnapshot {
        let state = self.state();
        ScreenshotSnapshot {
            status: state.status.clone(),
            page: state.page.clone(),
            refreshing: state.refreshes > 0,
            deleting_all: state.deleting_all,
            deleting_id: state.deleting_id.clone(),
            fullscreen: state.fullscreen,
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

    pub fn is_refreshing(&self) -> bool {
        self.state().refreshes > 0
    }

    pub fn is_deleting_all(&self) -> bool {
        self.state().deleting_all
    }

    /// Compact pagination row for the current page.
    pub fn pagination_window(&self) -> Vec<PageItem> {
        let state = self.state();
        pagination::pagination_window(state.page.current_page, state.page.total_pages)
    }

    /// Resets to a freshly mounted view and loads the first unfiltered page.
    pub async fn mount(&self) -> Result<LoadOutcome, ScreenshotError> {
        {
            let mut state = self.state();
            let (latest_request, refreshes) = (state.latest_request, state.refreshes);
            *state = ScreenshotState {
                latest_request,
                refreshes,
                ..ScreenshotState::initial()
            };
        }
        self.load(1, None).await
    }

    /// Fetches `page` restricted to `filter_date` and replaces the page state.
    pub async fn load(
        &self,
        page: u32,
        filter_date: Option<NaiveDate>,
    ) -> Result<LoadOutcome, ScreenshotError> {
        self.fetch(page, filter_date, false).await
    }

    /// Re-issues the most recent page and filter request without entering
    /// `Loading`, so the grid stays visible while `refreshing` is set.
    pub async fn reload(&self) -> Result<LoadOutcome, ScreenshotError> {
        let (page, filter_date) = {
            let mut state = self.state();
            state.refreshes += 1;
            state.requested
        };

        let result = self.fetch(page, filter_date, true).await;

        let mut state = self.state();
        state.refreshes = state.refreshes.saturating_sub(1);
        result
    }

    async fn fetch(
        &self,
        page: u32,
        filter_date: Option<NaiveDate>,
        refresh: bool,
    ) -> Result<LoadOutcome, ScreenshotError> {
        let mut page = page;
        loop {
            let request = {
                let mut state = self.state();
                state.latest_request += 1;
                if !refresh {
                    state.status = LoadStatus::Loading;
                }
                state.requested = (page, filter_date);
                state.page.filter_date = filter_date;
                state.latest_request
            };

            log::debug!(
                "{} screenshots page {} (filter: {:?}, request #{})",
                if refresh { "Refreshing" } else { "Loading" },
                page,
                filter_date,
                request
            );
            let query = PageQuery::new(page, self.page_size, filter_date);
            let result = self.service.list_screenshots(&query).await;

            let mut state = self.state();
            if state.latest_request != request {
                log::debug!(
                    "Discarding screenshot response #{} (latest is #{})",
                    request,
                    state.latest_request
                );
                return Ok(LoadOutcome::Superseded);
            }

            let response = match result {
                Ok(response) => response,
                Err(source) => {
                    let err = ScreenshotError::Load { page, source };
                    log::error!("{}", err);
                    state.status = LoadStatus::Error(err.user_message().to_string());
                    return Err(err);
                }
            };

            let last_page = response.total_pages.max(1);
            if page > last_page {
                log::debug!(
                    "Screenshot page {} no longer exists, loading page {}",
                    page,
                    last_page
                );
                drop(state);
                page = last_page;
                continue;
            }

            state.page = PageState::from_response(
                page,
                response.total_pages,
                response.total_count,
                filter_date,
                response.screenshots,
            );
            let len = state.page.items.len();
            state.fullscreen = match state.fullscreen {
                Some(_) if len == 0 => None,
                Some(index) => Some(index.min(len - 1)),
                None => None,
            };
            state.status = LoadStatus::Ready;
            log::debug!(
                "Screenshot page {}/{} loaded: {} of {} screenshots",
                state.page.current_page,
                state.page.total_pages,
                len,
                state.page.total_count
            );
            return Ok(LoadOutcome::Applied);
        }
    }

    /// Navigates to `page` under the current filter; out-of-range pages are ignored.
    pub async fn change_page(&self, page: u32) -> Result<LoadOutcome, ScreenshotError> {
        let (total_pages, filter_date) = {
            let state = self.state();
            (state.page.total_pages, state.requested.1)
        };
        if !pagination::in_bounds(page, total_pages) {
            log::debug!("Ignoring screenshot page {} (1..={})", page, total_pages);
            return Ok(LoadOutcome::OutOfRange);
        }
        self.load(page, filter_date).await
    }

    pub async fn next_page(&self) -> Result<LoadOutcome, ScreenshotError> {
        let current = self.current_page();
        self.change_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> Result<LoadOutcome, ScreenshotError> {
        let current = self.current_page();
        self.change_page(current.saturating_sub(1)).await
    }

    /// Restricts the view to `date`, starting again from page 1.
    pub async fn set_filter(&self, date: NaiveDate) -> Result<LoadOutcome, ScreenshotError> {
        self.load(1, Some(date)).await
    }

    /// Drops the date restriction, starting again from page 1.
    pub async fn clear_filter(&self) -> Result<LoadOutcome, ScreenshotError> {
        self.load(1, None).await
    }

    /// Deletes one screenshot and removes it from the current page.
    ///
    /// `total_count` drops by one and the full-screen cursor is moved with
    /// [`cursor_after_removal`]. Returns whether the entry was on the page.
    pub async fn delete_item(&self, id: &str) -> Result<bool, ScreenshotError> {
        self.state().deleting_id = Some(id.to_string());

        let result = self.service.delete_screenshot(id).await;

        let mut state = self.state();
        if state.deleting_id.as_deref() == Some(id) {
            state.deleting_id = None;
        }

        if let Err(source) = result {
            let err = ScreenshotError::DeleteItem {
                id: id.to_string(),
                source,
            };
            log::warn!("{}", err);
            return Err(err);
        }

        let Some(position) = state.page.items.iter().position(|e| e.id == id) else {
            log::info!("Deleted screenshot {} (not on the current page)", id);
            return Ok(false);
        };
        state.page.items.remove(position);
        state.page.total_count = state.page.total_count.saturating_sub(1);
        let remaining = state.page.items.len();
        state.fullscreen = cursor_after_removal(state.fullscreen, position, remaining);

        log::info!("Deleted screenshot {}", id);
        Ok(true)
    }

    /// Deletes every screenshot of `date` after `confirm` approves it, then
    /// clears the filter and reloads page 1.
    pub async fn delete_all_for_date(
        &self,
        date: Option<NaiveDate>,
        confirm: &dyn Confirm,
    ) -> Result<BulkDelete, ScreenshotError> {
        let Some(date) = date else {
            return Ok(BulkDelete::NoDate);
        };
        let prompt = format!("Are you sure you want to delete all images for {}?", date);
        if !confirm.confirm(&prompt) {
            log::debug!("Bulk delete for {} cancelled", date);
            return Ok(BulkDelete::Cancelled);
        }

        self.state().deleting_all = true;
        let result = self.service.delete_screenshots_for_date(date).await;
        self.state().deleting_all = false;

        if let Err(source) = result {
            let err = ScreenshotError::DeleteDate { date, source };
            log::warn!("{}", err);
            return Err(err);
        }
        log::info!("All images for {} have been deleted", date);

        self.load(1, None).await?;
        Ok(BulkDelete::Deleted)
    }

    /// [`delete_all_for_date`](Self::delete_all_for_date) for the active filter.
    pub async fn delete_all_for_filter(
        &self,
        confirm: &dyn Confirm,
    ) -> Result<BulkDelete, ScreenshotError> {
        let date = self.filter_date();
        self.delete_all_for_date(date, confirm).await
    }

    pub fn fullscreen_index(&self) -> Option<usize> {
        self.state().fullscreen
    }

    /// The screenshot under the full-screen cursor.
    pub fn fullscreen_entry(&self) -> Option<ScreenshotEntry> {
        let state = self.state();
        state.fullscreen.and_then(|i| state.page.items.get(i).cloned())
    }

    /// Opens the full-screen view at `index`; ignored if past the page end.
    pub fn open_fullscreen(&self, index: usize) -> bool {
        let mut state = self.state();
        if index < state.page.items.len() {
            state.fullscreen = Some(index);
            true
        } else {
            false
        }
    }

    pub fn close_fullscreen(&self) {
        self.state().fullscreen = None;
    }

    /// Steps back one image; stays put on the first one.
    pub fn previous_screenshot(&self) -> Option<usize> {
        let mut state = self.state();
        if let Some(index) = state.fullscreen {
            if index > 0 {
                state.fullscreen = Some(index - 1);
            }
        }
        state.fullscreen
    }

    /// Steps forward one image; stays put on the last one.
    pub fn next_screenshot(&self) -> Option<usize> {
        let mut state = self.state();
        if let Some(index) = state.fullscreen {
            if index + 1 < state.page.items.len() {
                state.fullscreen = Some(index + 1);
            }
        }
        state.fullscreen
    }
}
