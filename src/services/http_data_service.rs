//! HTTP implementation of the Remote Data Service.
//!
//! One attempt per call, no retries; transport failures and non-2xx
//! responses come back as [`ServiceError`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::services::remote_data_service::{
    history_bulk_date, screenshot_bulk_date, RemoteDataService,
};
use crate::types::errors::ServiceError;
use crate::types::history::HistoryPage;
use crate::types::page::PageQuery;
use crate::types::screenshot::ScreenshotPage;
use crate::types::settings::ApiSettings;

const HISTORY_RESOURCE: &str = "history";
const SCREENSHOTS_RESOURCE: &str = "screenshots";

/// Remote data service reached over HTTP with `reqwest`.
pub struct HttpDataService {
    client: Client,
    base_url: Url,
}

impl HttpDataService {
    /// Builds a client for `settings.base_url` with the configured timeout.
    pub fn new(settings: &ApiSettings) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", settings.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(settings.base_url.clone()));
        }

        let client = Client::builder()
            .user_agent(concat!("history-viewer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base URL path, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &PageQuery,
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(&[resource])?;
        log::debug!("GET {} page={} limit={}", url, query.page, query.limit);

        let response = self
            .client
            .get(url)
            .query(&query.to_query_pairs())
            .send()
            .await?;
        let response = check_status(response, resource).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn delete_one(&self, resource: &str, id: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(&[resource, id])?;
        log::debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        check_status(response, id).await?;
        Ok(())
    }

    async fn delete_by_date(&self, resource: &str, date: String) -> Result<(), ServiceError> {
        let url = self.endpoint(&[resource])?;
        log::debug!("DELETE {} date={}", url, date);

        let response = self
            .client
            .delete(url)
            .json(&json!({ "date": date }))
            .send()
            .await?;
        check_status(response, resource).await?;
        Ok(())
    }
}

/// Maps non-success responses to errors, keeping the body for diagnostics.
async fn check_status(
    response: reqwest::Response,
    subject: &str,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ServiceError::NotFound(subject.to_string()));
    }
    let message = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RemoteDataService for HttpDataService {
    async fn list_history(&self, query: &PageQuery) -> Result<HistoryPage, ServiceError> {
        self.get_page(HISTORY_RESOURCE, query).await
    }

    async fn delete_history_entry(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_one(HISTORY_RESOURCE, id).await
    }

    async fn delete_history_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.delete_by_date(HISTORY_RESOURCE, history_bulk_date(date))
            .await
    }

    async fn list_screenshots(&self, query: &PageQuery) -> Result<ScreenshotPage, ServiceError> {
        self.get_page(SCREENSHOTS_RESOURCE, query).await
    }

    async fn delete_screenshot(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_one(SCREENSHOTS_RESOURCE, id).await
    }

    async fn delete_screenshots_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.delete_by_date(SCREENSHOTS_RESOURCE, screenshot_bulk_date(date))
            .await
    }
}
