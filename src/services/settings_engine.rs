// History viewer settings engine
// Loads, saves, updates and resets the viewer settings.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ViewerSettings;

/// Environment variable overriding `api.base_url` at load time.
pub const API_URL_ENV: &str = "HISTORY_VIEWER_API_URL";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ViewerSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ViewerSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ViewerSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses `settings.json` inside the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: ViewerSettings::default(),
        }
    }

    /// Applies environment overrides on top of the loaded settings.
    fn apply_env_overrides(settings: &mut ViewerSettings) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                log::debug!("{} overrides api.base_url", API_URL_ENV);
                settings.api.base_url = url.to_string();
            }
        }
    }

    /// Rejects values that would break a controller even though they deserialize.
    fn validate(settings: &ViewerSettings) -> Result<(), SettingsError> {
        if settings.history.page_size == 0 || settings.screenshots.page_size == 0 {
            return Err(SettingsError::InvalidValue(
                "page_size must be at least 1".to_string(),
            ));
        }
        if settings.api.timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "api.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults; a malformed one is a serialization error.
    fn load(&mut self) -> Result<ViewerSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        let mut settings = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
            serde_json::from_str(&content).map_err(|e| {
                SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
            })?
        } else {
            log::debug!("No settings file at {}, using defaults", self.config_path);
            ViewerSettings::default()
        };

        Self::validate(&settings)?;
        Self::apply_env_overrides(&mut settings);

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// Updates one setting by dot-separated key path (`"api.base_url"`,
    /// `"screenshots.page_size"`), validates the result and saves it.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.trim().is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };

        let mut target = &mut json_value;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            target = target
                .get_mut(part)
                .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        }

        let map = target.as_object_mut().ok_or_else(|| {
            SettingsError::InvalidKey(format!(
                "Cannot navigate to key '{}': intermediate value is not an object",
                key
            ))
        })?;
        if !map.contains_key(leaf) {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            )));
        }
        map.insert(leaf.to_string(), value);

        let new_settings: ViewerSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        Self::validate(&new_settings)?;

        self.settings = new_settings;
        self.save()
    }

    /// Restores defaults and saves them.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ViewerSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
