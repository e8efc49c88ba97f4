pub mod api;
pub mod core;
pub mod shared;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::lifecycle::{ControllerConfig, RequestLifecycleController};
use crate::core::notifications::NotificationCenter;
use crate::core::provider::{CompletionProvider, OpenAiProvider};
use crate::core::security::credential::{CredentialStore, KeyringCredentialStore};
use crate::core::transcript::TranscriptStore;
use crate::shared::emit::EventBus;
use crate::shared::error::AppResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::{AppSettings, ProviderSettings};

/// Builds the provider for a given provider configuration.
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderSettings) -> AppResult<Arc<dyn CompletionProvider>> + Send + Sync>;

/// The default factory: an OpenAI-compatible HTTP client
pub fn openai_factory() -> ProviderFactory {
    Arc::new(|settings: &ProviderSettings| {
        let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(settings)?);
        Ok(provider)
    })
}

/// Everything a host shell needs to serve the UI, shared by all commands.
pub struct AppState {
    pub controller: Arc<RequestLifecycleController>,
    pub(crate) credentials: Arc<dyn CredentialStore>,
    pub(crate) settings: RwLock<AppSettings>,
    /// None means the platform config directory
    pub(crate) settings_path: Option<PathBuf>,
    pub(crate) provider_factory: ProviderFactory,
    pub(crate) events: EventBus,
}

impl AppState {
    pub fn new(
        settings: AppSettings,
        credentials: Arc<dyn CredentialStore>,
        provider_factory: ProviderFactory,
    ) -> AppResult<Self> {
        let credential = match credentials.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Failed to load API key, continuing without one");
                None
            }
        };
        if credential.is_none() {
            info!("No API key configured yet");
        }

        let events = EventBus::new();
        let provider = provider_factory(&settings.provider)?;
        let controller = RequestLifecycleController::new(
            ControllerConfig::from_settings(&settings, credential),
            provider,
            TranscriptStore::new(events.clone()),
            NotificationCenter::new(events.clone(), settings.dismiss_after()),
        );

        Ok(Self {
            controller: Arc::new(controller),
            credentials,
            settings: RwLock::new(settings),
            settings_path: None,
            provider_factory,
            events,
        })
    }

    /// Persist settings to `path` instead of the platform config directory.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub(crate) fn settings(&self) -> AppSettings {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn replace_settings(&self, settings: AppSettings) {
        match self.settings.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load settings and the stored API key and wire up the application state.
pub async fn bootstrap() -> AppResult<AppState> {
    init_tracing();

    let settings = AppSettings::load().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings, using defaults");
        AppSettings::default()
    });

    let state = AppState::new(
        settings,
        Arc::new(KeyringCredentialStore::new()),
        openai_factory(),
    )?;

    info!("AI Text Processing initialized");
    Ok(state)
}
