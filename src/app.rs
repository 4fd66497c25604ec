//! App shell for the history viewer.
//!
//! Holds the settings, the shared remote data service and both controllers,
//! and tracks which of the two views is mounted.

use std::sync::{Arc, Mutex, PoisonError};

use crate::controllers::history_controller::HistoryController;
use crate::controllers::screenshot_controller::ScreenshotController;
use crate::services::http_data_service::HttpDataService;
use crate::services::remote_data_service::RemoteDataService;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::ServiceError;
use crate::types::page::LoadOutcome;
use crate::types::settings::ViewerSettings;
use crate::types::view::View;

/// Central application struct: settings, service and the two list controllers.
pub struct App {
    pub settings: ViewerSettings,
    pub service: Arc<dyn RemoteDataService>,
    pub history: HistoryController,
    pub screenshots: ScreenshotController,
    view: Mutex<View>,
}

impl App {
    /// Creates an App over an already constructed service.
    pub fn new(settings: ViewerSettings, service: Arc<dyn RemoteDataService>) -> Self {
        let history = HistoryController::new(service.clone(), settings.history.page_size);
        let screenshots =
            ScreenshotController::new(service.clone(), settings.screenshots.page_size);
        let view = Mutex::new(settings.general.default_view);

        Self {
            settings,
            service,
            history,
            screenshots,
            view,
        }
    }

    /// Creates an App talking HTTP to `settings.api.base_url`.
    pub fn from_settings(settings: ViewerSettings) -> Result<Self, ServiceError> {
        let service = HttpDataService::new(&settings.api)?;
        log::info!("Using remote data service at {}", service.base_url());
        Ok(Self::new(settings, Arc::new(service)))
    }

    /// Loads settings from `config_path` (or the platform default) and builds an HTTP-backed App.
    pub fn load(config_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut engine = SettingsEngine::new(config_path);
        let settings = engine.load()?;
        Ok(Self::from_settings(settings)?)
    }

    pub fn current_view(&self) -> View {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches the shell to `view`. The caller mounts it with [`mount_current`](Self::mount_current).
    pub fn set_view(&self, view: View) {
        let mut current = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != view {
            log::info!("Switching view: {} -> {}", *current, view);
        }
        *current = view;
    }

    /// Mounts the current view from scratch: page 1, no filter.
    ///
    /// Errors carry the user-facing message of the failed load.
    pub async fn mount_current(&self) -> Result<LoadOutcome, String> {
        match self.current_view() {
            View::History => self
                .history
                .mount()
                .await
                .map_err(|e| e.user_message().to_string()),
            View::Screenshots => self
                .screenshots
                .mount()
                .await
                .map_err(|e| e.user_message().to_string()),
        }
    }
}
