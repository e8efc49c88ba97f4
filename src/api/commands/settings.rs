//! Settings command module
//!
//! Handles settings persistence and the provider API key.

use serde::Serialize;
use tracing::info;
use ts_rs::TS;
use super::CommandResult;
use crate::core::security::credential::ApiKey;
use crate::shared::emit::emit_event;
use crate::shared::events::AppEvent;
use crate::shared::settings::AppSettings;
use crate::AppState;

/// What the settings screen shows about the stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiKeyStatus {
    pub configured: bool,
    /// Masked placeholder, never the key itself
    pub masked: Option<String>,
}

/// Get current application settings
pub fn get_settings(state: &AppState) -> AppSettings {
    state.settings()
}

/// Save application settings and apply them to the running session.
///
/// The provider is rebuilt before anything is written, so an unusable
/// configuration leaves both the file and the session unchanged.
pub async fn save_settings(state: &AppState, settings: AppSettings) -> CommandResult<AppSettings> {
    let provider = (state.provider_factory)(&settings.provider)?;

    match &state.settings_path {
        Some(path) => settings.save_to(path).await?,
        None => settings.save().await?,
    }

    state.controller.reconfigure(&settings, provider);
    state.replace_settings(settings.clone());
    emit_event(&state.events, AppEvent::SettingsUpdated(settings.clone()));
    Ok(settings)
}

/// Validate, persist and start using a new API key.
pub fn save_api_key(state: &AppState, key: String) -> CommandResult<ApiKeyStatus> {
    let key = ApiKey::new(key)?;
    state.credentials.save(&key)?;
    state.controller.set_credential(Some(key));
    info!("API key updated");
    Ok(get_api_key_status(state))
}

pub fn clear_api_key(state: &AppState) -> CommandResult<ApiKeyStatus> {
    state.credentials.clear()?;
    state.controller.set_credential(None);
    info!("API key removed");
    Ok(get_api_key_status(state))
}

pub fn get_api_key_status(state: &AppState) -> ApiKeyStatus {
    let key = state.controller.credential();
    ApiKeyStatus {
        configured: key.is_some(),
        masked: key.map(|k| k.masked().to_string()),
    }
}
