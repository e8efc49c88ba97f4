use serde::{Deserialize, Serialize};
use ts_rs::TS;
use tokio::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use tracing::{debug, info};
use crate::core::features::text_analyser_logic::SummarizeThreshold;
use crate::core::features::translator::types::DEFAULT_TARGET_CODES;
use crate::shared::error::{AppError, AppResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_DISMISS_AFTER_MS: u64 = 3000;

/// Non-secret application settings. The API key lives in the keyring, see
/// `core::security::credential`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct AppSettings {
    pub provider: ProviderSettings,
    pub preferences: UserPreferences,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProviderSettings {
    /// Base of an OpenAI-compatible API, without the trailing `/chat/completions`
    pub base_url: String,
    pub model: String,
    /// Unset means the HTTP client default
    #[ts(type = "number | null")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct UserPreferences {
    pub default_target_lang: String,
    /// ISO 639-1/639-3 codes offered in the translate picker
    pub target_languages: Vec<String>,
    pub summarize_threshold: SummarizeThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct NotificationSettings {
    #[ts(type = "number")]
    pub dismiss_after_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_target_lang: "en".to_string(),
            target_languages: DEFAULT_TARGET_CODES.iter().map(|c| c.to_string()).collect(),
            summarize_threshold: SummarizeThreshold::default(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            dismiss_after_ms: DEFAULT_DISMISS_AFTER_MS,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            preferences: UserPreferences::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "ai-text-processing")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::System("Failed to determine config directory".to_string()))
    }

    /// Load settings from the platform config directory, falling back to
    /// defaults when nothing was saved yet.
    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !fs::try_exists(path).await? {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Validation(format!("Failed to parse settings: {}", e)))
    }

    pub async fn save(&self) -> AppResult<()> {
        let path = Self::get_settings_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    pub fn dismiss_after(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.notifications.dismiss_after_ms)
    }
}
