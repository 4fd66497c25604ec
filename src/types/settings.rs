use serde::{Deserialize, Serialize};

use super::view::View;

/// Top-level viewer settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewerSettings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub history: ListSettings,
    pub screenshots: ListSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            api: ApiSettings::default(),
            history: ListSettings {
                page_size: Self::HISTORY_PAGE_SIZE,
            },
            screenshots: ListSettings {
                page_size: Self::SCREENSHOT_PAGE_SIZE,
            },
        }
    }
}

impl ViewerSettings {
    /// Page size the history endpoint is queried with.
    pub const HISTORY_PAGE_SIZE: u32 = 2000;
    /// Page size the screenshots endpoint is queried with.
    pub const SCREENSHOT_PAGE_SIZE: u32 = 1000;
}

/// General viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneralSettings {
    /// View shown on startup.
    pub default_view: View,
}

/// Remote data service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Per-list settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListSettings {
    pub page_size: u32,
}
