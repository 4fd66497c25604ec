use chrono::NaiveDate;
use thiserror::Error;

// === ServiceError ===

/// Errors raised by a remote data service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),
    /// The transport gave up waiting for a response.
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// The server answered with a non-success status code.
    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),
    /// The configured base URL cannot be used to build an endpoint.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    /// The addressed entry does not exist on the server.
    #[error("Entry not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err.to_string())
        } else if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

// === HistoryError ===

/// Errors surfaced by the history controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    /// Fetching a page failed; the controller is now in its error state.
    #[error("Failed to load history page {page}: {source}")]
    Load { page: u32, source: ServiceError },
    /// Deleting a single entry failed; local state is untouched.
    #[error("Failed to delete history entry {id}: {source}")]
    DeleteItem { id: String, source: ServiceError },
    /// Deleting every entry of a date failed; local state is untouched.
    #[error("Failed to delete history for {date}: {source}")]
    DeleteDate { date: NaiveDate, source: ServiceError },
}

impl HistoryError {
    /// The fixed message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            HistoryError::Load { .. } => "Failed to load browsing history.",
            HistoryError::DeleteItem { .. } => "Failed to delete history item.",
            HistoryError::DeleteDate { .. } => "Failed to delete history for this date.",
        }
    }

    /// Whether this failure leaves the controller in its terminal error state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HistoryError::Load { .. })
    }
}

// === ScreenshotError ===

/// Errors surfaced by the screenshot controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScreenshotError {
    /// Fetching a page failed; the controller is now in its error state.
    #[error("Failed to load screenshot page {page}: {source}")]
    Load { page: u32, source: ServiceError },
    /// Deleting a single screenshot failed; local state is untouched.
    #[error("Failed to delete screenshot {id}: {source}")]
    DeleteItem { id: String, source: ServiceError },
    /// Deleting every screenshot of a date failed; local state is untouched.
    #[error("Failed to delete screenshots for {date}: {source}")]
    DeleteDate { date: NaiveDate, source: ServiceError },
}

impl ScreenshotError {
    /// The fixed message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ScreenshotError::Load { .. } => "Failed to load screenshots.",
            ScreenshotError::DeleteItem { .. } => "Failed to delete screenshot.",
            ScreenshotError::DeleteDate { .. } => "Failed to delete images for the selected date.",
        }
    }

    /// Whether this failure leaves the controller in its terminal error state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScreenshotError::Load { .. })
    }
}

// === ImageError ===

/// Errors related to decoding a screenshot's image reference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    /// A `data:` URL without the `,` separating header and payload.
    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),
    /// The inline payload is not valid base64.
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),
}

// === SettingsError ===

/// Errors related to settings management operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred reading or writing the settings file.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
