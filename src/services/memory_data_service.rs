//! In-process Remote Data Service.
//!
//! Holds history and screenshot entries in memory, paginates and filters them
//! the way the backend does, and records every request it receives. Used by
//! the demo binary and by tests that need a substitutable backend.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::services::remote_data_service::RemoteDataService;
use crate::types::errors::ServiceError;
use crate::types::history::{HistoryEntry, HistoryPage};
use crate::types::page::PageQuery;
use crate::types::screenshot::{ScreenshotEntry, ScreenshotPage};

/// Operations of the service, used for request logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListHistory,
    DeleteHistoryEntry,
    DeleteHistoryForDate,
    ListScreenshots,
    DeleteScreenshot,
    DeleteScreenshotsForDate,
}

/// A request as seen by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    ListHistory(PageQuery),
    DeleteHistoryEntry(String),
    DeleteHistoryForDate(NaiveDate),
    ListScreenshots(PageQuery),
    DeleteScreenshot(String),
    DeleteScreenshotsForDate(NaiveDate),
}

impl RecordedRequest {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedRequest::ListHistory(_) => Operation::ListHistory,
            RecordedRequest::DeleteHistoryEntry(_) => Operation::DeleteHistoryEntry,
            RecordedRequest::DeleteHistoryForDate(_) => Operation::DeleteHistoryForDate,
            RecordedRequest::ListScreenshots(_) => Operation::ListScreenshots,
            RecordedRequest::DeleteScreenshot(_) => Operation::DeleteScreenshot,
            RecordedRequest::DeleteScreenshotsForDate(_) => Operation::DeleteScreenshotsForDate,
        }
    }
}

#[derive(Default)]
struct Store {
    history: Vec<HistoryEntry>,
    screenshots: Vec<ScreenshotEntry>,
    failing: HashSet<Operation>,
    requests: Vec<RecordedRequest>,
}

/// Remote data service backed by in-memory vectors.
#[derive(Default)]
pub struct InMemoryDataService {
    store: Mutex<Store>,
}

impl InMemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a history entry and returns its generated ID.
    pub fn add_history(&self, url: &str, timestamp: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        self.store().history.push(HistoryEntry {
            id: id.clone(),
            url: url.to_string(),
            timestamp,
        });
        id
    }

    /// Adds a screenshot entry and returns its generated ID.
    pub fn add_screenshot(&self, screenshot: &str, timestamp: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        self.store().screenshots.push(ScreenshotEntry {
            id: id.clone(),
            screenshot: screenshot.to_string(),
            timestamp,
        });
        id
    }

    pub fn history_len(&self) -> usize {
        self.store().history.len()
    }

    pub fn screenshot_len(&self) -> usize {
        self.store().screenshots.len()
    }

    /// Makes every subsequent call of `op` fail (or succeed again).
    pub fn set_failing(&self, op: Operation, failing: bool) {
        let mut store = self.store();
        if failing {
            store.failing.insert(op);
        } else {
            store.failing.remove(&op);
        }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.store().requests.clone()
    }

    /// Number of requests received for `op`.
    pub fn request_count(&self, op: Operation) -> usize {
        self.store()
            .requests
            .iter()
            .filter(|r| r.operation() == op)
            .count()
    }

    pub fn clear_requests(&self) {
        self.store().requests.clear();
    }

    /// Records `request` and returns the store, or the injected failure.
    fn begin(&self, request: RecordedRequest) -> Result<MutexGuard<'_, Store>, ServiceError> {
        let mut store = self.store();
        let op = request.operation();
        store.requests.push(request);
        if store.failing.contains(&op) {
            return Err(ServiceError::Status {
                status: 500,
                message: format!("injected failure for {:?}", op),
            });
        }
        Ok(store)
    }
}

/// Newest first, restricted to `filter` (UTC calendar date), sliced to one page.
fn paginate<T: Clone>(
    items: &[T],
    timestamp: impl Fn(&T) -> DateTime<Utc>,
    query: &PageQuery,
) -> (Vec<T>, u32, u64) {
    let mut matching: Vec<T> = items
        .iter()
        .filter(|item| match query.filter_date {
            Some(date) => timestamp(item).date_naive() == date,
            None => true,
        })
        .cloned()
        .collect();
    matching.sort_by_key(|item| std::cmp::Reverse(timestamp(item)));

    let total_count = matching.len() as u64;
    let limit = query.limit.max(1) as u64;
    let total_pages = total_count.div_ceil(limit) as u32;
    let skip = (query.page.saturating_sub(1) as u64).saturating_mul(limit) as usize;

    let page = matching.into_iter().skip(skip).take(limit as usize).collect();
    (page, total_pages, total_count)
}

#[async_trait]
impl RemoteDataService for InMemoryDataService {
    async fn list_history(&self, query: &PageQuery) -> Result<HistoryPage, ServiceError> {
        let store = self.begin(RecordedRequest::ListHistory(*query))?;
        let (history, total_pages, total_count) =
            paginate(&store.history, |e| e.timestamp, query);
        Ok(HistoryPage {
            history,
            total_pages,
            total_count,
            current_page: query.page,
        })
    }

    async fn delete_history_entry(&self, id: &str) -> Result<(), ServiceError> {
        let mut store = self.begin(RecordedRequest::DeleteHistoryEntry(id.to_string()))?;
        let before = store.history.len();
        store.history.retain(|e| e.id != id);
        if store.history.len() == before {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_history_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        let mut store = self.begin(RecordedRequest::DeleteHistoryForDate(date))?;
        store.history.retain(|e| e.timestamp.date_naive() != date);
        Ok(())
    }

    async fn list_screenshots(&self, query: &PageQuery) -> Result<ScreenshotPage, ServiceError> {
        let store = self.begin(RecordedRequest::ListScreenshots(*query))?;
        let (screenshots, total_pages, total_count) =
            paginate(&store.screenshots, |e| e.timestamp, query);
        Ok(ScreenshotPage {
            screenshots,
            total_pages,
            total_count,
        })
    }

    async fn delete_screenshot(&self, id: &str) -> Result<(), ServiceError> {
        let mut store = self.begin(RecordedRequest::DeleteScreenshot(id.to_string()))?;
        let before = store.screenshots.len();
        store.screenshots.retain(|e| e.id != id);
        if store.screenshots.len() == before {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_screenshots_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        let mut store = self.begin(RecordedRequest::DeleteScreenshotsForDate(date))?;
        store.screenshots.retain(|e| e.timestamp.date_naive() != date);
        Ok(())
    }
}
