use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use tracing::info;
use super::error::{AppError, AppResult};
use crate::core::translator::languages::{is_supported_source, is_supported_target};

pub const DEFAULT_ENDPOINT: &str = "https://api.fanyi.baidu.com/api/trans/vip/translate";
pub const DEFAULT_HISTORY_KEY: &str = "translationHistory";
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 10;

pub const ENV_APP_ID: &str = "TRANSLATOR_APP_ID";
pub const ENV_SECRET_KEY: &str = "TRANSLATOR_SECRET_KEY";
pub const ENV_ENDPOINT: &str = "TRANSLATOR_ENDPOINT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub preferences: UserPreferences,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub endpoint: String,
    pub app_id: String,
    pub secret_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    pub default_source_lang: String,
    pub default_target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    pub max_items: usize,
    pub storage_key: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            preferences: UserPreferences::default(),
            history: HistorySettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_id: String::new(),
            secret_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_source_lang: "auto".to_string(),
            default_target_lang: "en".to_string(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_HISTORY_ITEMS,
            storage_key: DEFAULT_HISTORY_KEY.to_string(),
        }
    }
}

fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("com", "antigravity", "selection-translator")
        .ok_or_else(|| AppError::Config("Failed to determine project directories".to_string()))
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("settings.json"))
    }

    /// Directory holding the history database
    pub fn get_data_dir() -> AppResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    /// Load settings from `path`, writing defaults there first if the file does not exist yet
    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !fs::try_exists(path).await? {
            let settings = Self::default();
            settings.save_to(path).await?;
            info!("[Settings] Wrote default settings to {}", path.display());
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Overlay credentials and endpoint from a variable lookup; blank values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(app_id) = non_blank(ENV_APP_ID) {
            self.api.app_id = app_id;
        }
        if let Some(secret) = non_blank(ENV_SECRET_KEY) {
            self.api.secret_key = secret;
        }
        if let Some(endpoint) = non_blank(ENV_ENDPOINT) {
            self.api.endpoint = endpoint;
        }
    }

    /// Check that the settings are usable for signing requests
    pub fn validate(&self) -> AppResult<()> {
        if self.api.app_id.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Missing API app id (set api.app_id or {})",
                ENV_APP_ID
            )));
        }
        if self.api.secret_key.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Missing API secret key (set api.secret_key or {})",
                ENV_SECRET_KEY
            )));
        }
        reqwest::Url::parse(&self.api.endpoint)
            .map_err(|e| AppError::Config(format!("Invalid endpoint '{}': {}", self.api.endpoint, e)))?;
        if self.api.timeout_secs == 0 {
            return Err(AppError::Config("api.timeout_secs must be at least 1".to_string()));
        }
        if !is_supported_source(&self.preferences.default_source_lang) {
            return Err(AppError::Config(format!(
                "Unsupported source language '{}'",
                self.preferences.default_source_lang
            )));
        }
        if !is_supported_target(&self.preferences.default_target_lang) {
            return Err(AppError::Config(format!(
                "Unsupported target language '{}'",
                self.preferences.default_target_lang
            )));
        }
        if self.history.max_items == 0 {
            return Err(AppError::Config("history.max_items must be at least 1".to_string()));
        }
        if self.history.storage_key.is_empty() {
            return Err(AppError::Config("history.storage_key must not be empty".to_string()));
        }
        Ok(())
    }
}
