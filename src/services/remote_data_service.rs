//! Remote Data Service contract.
//!
//! The only collaborator both controllers talk to. Production code uses
//! [`HttpDataService`](crate::services::http_data_service::HttpDataService);
//! tests and the demo use
//! [`InMemoryDataService`](crate::services::memory_data_service::InMemoryDataService).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::errors::ServiceError;
use crate::types::history::HistoryPage;
use crate::types::page::PageQuery;
use crate::types::screenshot::ScreenshotPage;

/// List and delete operations exposed by the backend for both resource types.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// `GET /history?page&limit&filterDate`
    async fn list_history(&self, query: &PageQuery) -> Result<HistoryPage, ServiceError>;
    /// `DELETE /history/{id}`
    async fn delete_history_entry(&self, id: &str) -> Result<(), ServiceError>;
    /// `DELETE /history` with body `{ date }`
    async fn delete_history_for_date(&self, date: NaiveDate) -> Result<(), ServiceError>;
    /// `GET /screenshots?page&limit&filterDate`
    async fn list_screenshots(&self, query: &PageQuery) -> Result<ScreenshotPage, ServiceError>;
    /// `DELETE /screenshots/{id}`
    async fn delete_screenshot(&self, id: &str) -> Result<(), ServiceError>;
    /// `DELETE /screenshots` with body `{ date }`
    async fn delete_screenshots_for_date(&self, date: NaiveDate) -> Result<(), ServiceError>;
}

/// Body date for a history bulk delete: the calendar date itself.
pub fn history_bulk_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Body date for a screenshot bulk delete: UTC midnight of the date as an
/// ISO-8601 instant with millisecond precision.
pub fn screenshot_bulk_date(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
