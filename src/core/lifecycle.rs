//! Request lifecycle controller
//!
//! Turns a user action on a message (detect, translate, summarize) into one
//! provider request and folds the outcome back into the transcript:
//!
//! `idle -> in_flight -> settled (result | error)`
//!
//! Only one request per message may be in flight. Different messages are
//! independent and may settle in any order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use crate::core::features::text_analyser_logic::SummarizeThreshold;
use crate::core::features::translator::types::{LanguageCatalog, TargetLanguage};
use crate::core::features::{
    Capability, CapabilitySpec, LanguageDetection, Summarization, Translation,
};
use crate::core::notifications::NotificationCenter;
use crate::core::provider::CompletionProvider;
use crate::core::security::credential::ApiKey;
use crate::core::transcript::{MessageEvent, TranscriptStore};
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::AppSettings;
use crate::shared::types::{LanguageOption, Message, NotificationLevel, Operation};

/// Everything the controller needs to know, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub credential: Option<ApiKey>,
    pub model: String,
    pub summarize_threshold: SummarizeThreshold,
    pub languages: LanguageCatalog,
    /// Preselected in the translate picker; always part of `languages`
    pub default_target: Option<TargetLanguage>,
}

impl ControllerConfig {
    /// A default target outside the catalog falls back to the catalog's first
    /// language.
    pub fn from_settings(settings: &AppSettings, credential: Option<ApiKey>) -> Self {
        let languages = LanguageCatalog::from_codes(&settings.preferences.target_languages);
        let wanted = &settings.preferences.default_target_lang;
        let default_target = match languages.resolve(wanted) {
            Ok(lang) => Some(lang),
            Err(_) => {
                warn!(code = %wanted, "Default target language is not offered, using the first one");
                languages.first()
            }
        };

        Self {
            credential,
            model: settings.provider.model.clone(),
            summarize_threshold: settings.preferences.summarize_threshold,
            languages,
            default_target,
        }
    }
}

/// Clears the in-flight submission flag however `submit` returns.
struct SubmissionGuard<'a>(&'a AtomicBool);

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RequestLifecycleController {
    provider: RwLock<Arc<dyn CompletionProvider>>,
    config: RwLock<ControllerConfig>,
    store: TranscriptStore,
    notifications: NotificationCenter,
    submitting: AtomicBool,
}

impl RequestLifecycleController {
    pub fn new(
        config: ControllerConfig,
        provider: Arc<dyn CompletionProvider>,
        store: TranscriptStore,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            provider: RwLock::new(provider),
            config: RwLock::new(config),
            store,
            notifications,
            submitting: AtomicBool::new(false),
        }
    }

    fn config(&self) -> ControllerConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update_config(&self, f: impl FnOnce(&mut ControllerConfig)) {
        match self.config.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn provider(&self) -> Arc<dyn CompletionProvider> {
        match self.provider.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn set_credential(&self, credential: Option<ApiKey>) {
        self.update_config(|config| config.credential = credential);
    }

    pub fn credential(&self) -> Option<ApiKey> {
        self.config().credential
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    /// Pick up new settings; requests already in flight finish with the old
    /// provider.
    pub fn reconfigure(&self, settings: &AppSettings, provider: Arc<dyn CompletionProvider>) {
        self.update_config(|config| {
            let credential = config.credential.take();
            *config = ControllerConfig::from_settings(settings, credential);
        });
        match self.provider.write() {
            Ok(mut guard) => *guard = provider,
            Err(poisoned) => *poisoned.into_inner() = provider,
        }
        self.notifications.set_dismiss_after(settings.dismiss_after());
        info!(model = %settings.provider.model, "Controller reconfigured");
    }

    pub fn language_options(&self) -> Vec<LanguageOption> {
        self.config().languages.options()
    }

    pub fn default_language_option(&self) -> Option<LanguageOption> {
        self.config().default_target.map(|lang| lang.option())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Input problems are surfaced as a notification; everything is handed back.
    fn reject(&self, err: AppError) -> AppError {
        if err.is_input_validation() {
            self.notifications.show(err.to_string(), NotificationLevel::Error);
        }
        err
    }

    /// The credential, or `MissingCredential` with the error attached to `id`
    /// when nothing is in flight for it.
    fn require_credential(&self, id: &str, operation: Operation) -> AppResult<ApiKey> {
        if let Some(credential) = self.credential() {
            return Ok(credential);
        }
        let failed = MessageEvent::Failed {
            operation,
            message: AppError::MissingCredential.to_string(),
        };
        match self.store.apply_if_idle(id, failed) {
            Ok(_) | Err(AppError::RecordBusy(_)) => Err(AppError::MissingCredential),
            Err(e) => Err(e),
        }
    }

    /// Append `text` to the transcript and detect its language.
    ///
    /// Detection failures are recorded on the returned message rather than
    /// returned as an error.
    pub async fn submit(&self, text: String) -> AppResult<Message> {
        if text.trim().is_empty() {
            return Err(self.reject(AppError::EmptyInput));
        }
        if !self.has_credential() {
            return Err(AppError::MissingCredential);
        }
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::SubmissionInFlight);
        }
        let _guard = SubmissionGuard(&self.submitting);

        let message = self.store.append(text);
        if let Err(e) = self.detect(&message.id).await {
            debug!(id = %message.id, error = %e, "Detection failed on submit");
        }

        self.store
            .get(&message.id)
            .ok_or(AppError::MessageNotFound(message.id))
    }

    pub async fn detect(&self, id: &str) -> AppResult<String> {
        let credential = self.require_credential(id, Operation::Detect)?;
        self.run(id, Capability::from(LanguageDetection), credential).await
    }

    /// `target_code` has to be one of the catalog's languages.
    pub async fn translate(&self, id: &str, target_code: &str) -> AppResult<String> {
        let credential = self.require_credential(id, Operation::Translate)?;
        let target = self
            .config()
            .languages
            .resolve(target_code)
            .map_err(|e| self.reject(e))?;
        self.run(id, Capability::from(Translation::new(target)), credential).await
    }

    pub async fn summarize(&self, id: &str) -> AppResult<String> {
        let credential = self.require_credential(id, Operation::Summarize)?;
        if !self.can_summarize(id)? {
            return Err(self.reject(AppError::UnsupportedCapability(
                "text is too short to summarize".to_string(),
            )));
        }
        self.run(id, Capability::from(Summarization), credential).await
    }

    /// Whether the summarize action is offered for `id`
    pub fn can_summarize(&self, id: &str) -> AppResult<bool> {
        let message = self
            .store
            .get(id)
            .ok_or_else(|| AppError::MessageNotFound(id.to_string()))?;
        Ok(self.config().summarize_threshold.is_exceeded_by(&message.text))
    }

    /// Start a new session with an empty transcript.
    pub fn reset(&self) {
        self.store.clear();
        info!("Session reset");
    }

    async fn run(&self, id: &str, capability: Capability, credential: ApiKey) -> AppResult<String> {
        let operation = capability.operation();
        let model = self.config().model;

        let message = self.store.begin(id, operation)?;
        info!(%id, %operation, "Request started");

        let request = capability.completion_request(&model, &message.text);
        let outcome = match self.provider().complete(&credential, &request).await {
            Ok(raw) => {
                let output = raw.trim().to_string();
                if output.is_empty() {
                    Err(format!("{}: the provider returned an empty answer", capability.failure_context()))
                } else {
                    Ok(output)
                }
            }
            Err(e) => Err(format!("{}: {}", capability.failure_context(), e)),
        };

        let (event, result) = match outcome {
            Ok(output) => (capability.settle(output.clone()), Ok(output)),
            Err(reason) => {
                warn!(%id, %operation, %reason, "Request failed");
                (
                    MessageEvent::Failed { operation, message: reason.clone() },
                    Err(AppError::Provider(reason)),
                )
            }
        };

        // The session may have been reset while the request was out
        match self.store.apply(id, event) {
            Ok(_) => info!(%id, %operation, success = result.is_ok(), "Request settled"),
            Err(e) => debug!(%id, error = %e, "Dropping settlement for a message no longer in the transcript"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::ProviderError;
    use crate::shared::emit::EventBus;
    use crate::shared::types::MessageStatus;
    use crate::test_support::{ok, ScriptedProvider};
    use std::time::Duration;

    fn controller(provider: Arc<ScriptedProvider>, credential: Option<&str>) -> RequestLifecycleController {
        let bus = EventBus::new();
        let config = ControllerConfig::from_settings(
            &AppSettings::default(),
            credential.map(|k| ApiKey::new(k).unwrap()),
        );
        RequestLifecycleController::new(
            config,
            provider,
            TranscriptStore::new(bus.clone()),
            NotificationCenter::new(bus, Duration::from_secs(3)),
        )
    }

    fn long_passage() -> String {
        vec!["The quick brown fox jumps over the lazy dog."; 25].join(" ")
    }

    #[tokio::test]
    async fn test_submit_detects_language() {
        let provider = ScriptedProvider::with(vec![ok(" French\n")]);
        let controller = controller(provider.clone(), Some("sk-test"));

        let message = controller.submit("Bonjour le monde".to_string()).await.unwrap();

        assert_eq!(message.text, "Bonjour le monde");
        assert_eq!(message.detected_language.as_deref(), Some("French"));
        assert_eq!(message.status, MessageStatus::Settled);
        assert_eq!(message.error, None);
        assert!(!controller.is_submitting());

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(requests[0].user_text, "Bonjour le monde");
        assert!(!controller.can_summarize(&message.id).unwrap());
    }

    #[tokio::test]
    async fn test_submit_keeps_text_verbatim() {
        let provider = ScriptedProvider::with(vec![ok("English")]);
        let controller = controller(provider, Some("sk-test"));

        let message = controller.submit("  padded text \n".to_string()).await.unwrap();
        assert_eq!(message.text, "  padded text \n");
    }

    #[tokio::test]
    async fn test_blank_submission_appends_nothing() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider.clone(), Some("sk-test"));

        let err = controller.submit(" \t\n".to_string()).await.unwrap_err();

        assert_eq!(err, AppError::EmptyInput);
        assert!(controller.store().is_empty());
        assert!(provider.requests().is_empty());
        let notification = controller.notifications().current().unwrap();
        assert_eq!(notification.message, AppError::EmptyInput.to_string());
        assert_eq!(notification.level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_submit_without_credential_asks_for_configuration() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider.clone(), None);

        let err = controller.submit("Hello".to_string()).await.unwrap_err();

        assert!(err.is_configuration());
        assert!(controller.store().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_operations_without_credential_never_call_provider() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider.clone(), None);
        let message = controller.store().append(long_passage());

        assert_eq!(controller.detect(&message.id).await, Err(AppError::MissingCredential));
        assert_eq!(controller.translate(&message.id, "en").await, Err(AppError::MissingCredential));
        assert_eq!(controller.summarize(&message.id).await, Err(AppError::MissingCredential));

        assert!(provider.requests().is_empty());
        let current = controller.store().get(&message.id).unwrap();
        assert_eq!(current.error, Some(AppError::MissingCredential.to_string()));
        assert!(!current.is_processing());
    }

    #[tokio::test]
    async fn test_missing_credential_reported_before_other_checks() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider.clone(), None);
        let message = controller.store().append("Bonjour".to_string());

        assert_eq!(controller.summarize(&message.id).await, Err(AppError::MissingCredential));
        assert_eq!(controller.translate(&message.id, "xx").await, Err(AppError::MissingCredential));
        assert!(controller.notifications().current().is_none());

        controller.store().begin(&message.id, Operation::Detect).unwrap();
        assert_eq!(controller.detect(&message.id).await, Err(AppError::MissingCredential));
        assert!(controller.store().get(&message.id).unwrap().is_processing());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_while_detecting() {
        let provider = ScriptedProvider::gated(vec![ok("French")]);
        let controller = controller(provider.clone(), Some("sk-test"));

        let (first, second) = tokio::join!(
            controller.submit("Bonjour".to_string()),
            async {
                provider.entered().await;
                assert!(controller.is_submitting());
                let second = controller.submit("Hola".to_string()).await;
                provider.release();
                second
            }
        );

        assert_eq!(second, Err(AppError::SubmissionInFlight));
        assert_eq!(first.unwrap().detected_language.as_deref(), Some("French"));
        assert_eq!(controller.store().len(), 1);
        assert!(!controller.is_submitting());
    }

    #[tokio::test]
    async fn test_concurrent_request_on_same_message_is_busy() {
        let provider = ScriptedProvider::gated(vec![ok("Hello world")]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.store().append("Bonjour le monde".to_string());

        let (first, second) = tokio::join!(
            controller.translate(&message.id, "en"),
            async {
                provider.entered().await;
                let second = controller.translate(&message.id, "es").await;
                provider.release();
                second
            }
        );

        assert_eq!(second, Err(AppError::RecordBusy(message.id.clone())));
        assert_eq!(first.unwrap(), "Hello world");
        assert_eq!(provider.requests().len(), 1);
        let current = controller.store().get(&message.id).unwrap();
        assert_eq!(current.translation_language.as_deref(), Some("en"));
        assert_eq!(current.status, MessageStatus::Settled);
    }

    #[tokio::test]
    async fn test_settlement_after_reset_is_dropped() {
        let provider = ScriptedProvider::gated(vec![ok("French")]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.store().append("Bonjour".to_string());

        let (detected, _) = tokio::join!(
            controller.detect(&message.id),
            async {
                provider.entered().await;
                controller.reset();
                provider.release();
            }
        );

        assert_eq!(detected.unwrap(), "French");
        assert!(controller.store().is_empty());
        assert_eq!(controller.store().get(&message.id), None);
    }

    #[tokio::test]
    async fn test_translate_overwrites_only_translation() {
        let provider = ScriptedProvider::with(vec![
            ok("French"),
            ok("  Hello world  "),
            ok("Hola mundo"),
        ]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.submit("Bonjour le monde".to_string()).await.unwrap();

        let first = controller.translate(&message.id, "en").await.unwrap();
        assert_eq!(first, "Hello world");
        let after_first = controller.store().get(&message.id).unwrap();
        assert_eq!(after_first.translated_text.as_deref(), Some("Hello world"));
        assert_eq!(after_first.translation_language.as_deref(), Some("en"));

        controller.translate(&message.id, "es").await.unwrap();
        let after_second = controller.store().get(&message.id).unwrap();
        assert_eq!(after_second.translated_text.as_deref(), Some("Hola mundo"));
        assert_eq!(after_second.translation_language.as_deref(), Some("es"));
        assert_eq!(after_second.detected_language.as_deref(), Some("French"));
        assert_eq!(after_second.summarized_text, None);
        assert_eq!(after_second.text, "Bonjour le monde");

        let requests = provider.requests();
        assert_eq!(requests[1].max_tokens, 1000);
        assert!(requests[1].system_prompt.ends_with("to English."));
        assert!(requests[2].system_prompt.ends_with("to Spanish."));
    }

    #[tokio::test]
    async fn test_unsupported_target_changes_nothing() {
        let provider = ScriptedProvider::with(vec![ok("French"), ok("Hello world")]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.submit("Bonjour le monde".to_string()).await.unwrap();
        controller.translate(&message.id, "en").await.unwrap();
        let before = controller.store().get(&message.id).unwrap();

        let err = controller.translate(&message.id, "xx").await.unwrap_err();

        assert!(matches!(err, AppError::UnsupportedCapability(_)));
        assert_eq!(controller.store().get(&message.id).unwrap(), before);
        assert_eq!(provider.requests().len(), 2);
        assert!(controller.notifications().current().is_some());
    }

    #[tokio::test]
    async fn test_summarize_long_passage() {
        let passage = long_passage();
        let provider = ScriptedProvider::with(vec![ok("English"), ok("A fox jumps over a dog, repeatedly.")]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.submit(passage.clone()).await.unwrap();

        assert!(controller.can_summarize(&message.id).unwrap());
        let summary = controller.summarize(&message.id).await.unwrap();

        assert!(!summary.is_empty());
        assert!(summary.len() < passage.len());
        let current = controller.store().get(&message.id).unwrap();
        assert_eq!(current.summarized_text.as_deref(), Some(summary.as_str()));
        assert_eq!(current.text, passage);
        assert_eq!(provider.requests()[1].max_tokens, 300);
    }

    #[tokio::test]
    async fn test_summarize_below_threshold_is_rejected() {
        let provider = ScriptedProvider::with(vec![ok("French")]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.submit("Bonjour le monde".to_string()).await.unwrap();

        let err = controller.summarize(&message.id).await.unwrap_err();

        assert!(matches!(err, AppError::UnsupportedCapability(_)));
        assert_eq!(provider.requests().len(), 1);
        assert_eq!(controller.store().get(&message.id).unwrap().summarized_text, None);
    }

    #[tokio::test]
    async fn test_provider_failure_is_recorded_on_message() {
        let provider = ScriptedProvider::with(vec![
            ok("French"),
            ok("Hello world"),
            Err(ProviderError::Status { status: 500, body: "oops".to_string() }),
        ]);
        let controller = controller(provider, Some("sk-test"));
        let message = controller.submit("Bonjour le monde".to_string()).await.unwrap();
        controller.translate(&message.id, "en").await.unwrap();

        let err = controller.translate(&message.id, "fr").await.unwrap_err();

        match &err {
            AppError::Provider(reason) => assert!(reason.starts_with("Error translating text:")),
            other => panic!("unexpected error: {other:?}"),
        }
        let current = controller.store().get(&message.id).unwrap();
        assert_eq!(current.error, Some(err.to_string()));
        assert_eq!(current.translated_text.as_deref(), Some("Hello world"));
        assert_eq!(current.status, MessageStatus::Settled);
    }

    #[tokio::test]
    async fn test_blank_answer_is_failure() {
        let provider = ScriptedProvider::with(vec![ok("   ")]);
        let controller = controller(provider, Some("sk-test"));

        let message = controller.submit("Hello there".to_string()).await.unwrap();

        assert_eq!(message.detected_language, None);
        assert!(message.error.unwrap().starts_with("Error detecting language"));
    }

    #[tokio::test]
    async fn test_busy_message_rejects_new_request() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider.clone(), Some("sk-test"));
        let message = controller.store().append("Hello".to_string());
        controller.store().begin(&message.id, Operation::Translate).unwrap();

        let err = controller.detect(&message.id).await.unwrap_err();

        assert_eq!(err, AppError::RecordBusy(message.id.clone()));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_message() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider, Some("sk-test"));

        let err = controller.detect("nope").await.unwrap_err();
        assert_eq!(err, AppError::MessageNotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn test_credential_can_be_set_later() {
        let provider = ScriptedProvider::with(vec![ok("English")]);
        let controller = controller(provider, None);
        assert!(!controller.has_credential());

        controller.set_credential(Some(ApiKey::new("sk-late").unwrap()));
        let message = controller.submit("Hello".to_string()).await.unwrap();
        assert_eq!(message.detected_language.as_deref(), Some("English"));
    }

    #[tokio::test]
    async fn test_reconfigure_keeps_credential() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider.clone(), Some("sk-test"));

        let mut settings = AppSettings::default();
        settings.preferences.target_languages = vec!["en".to_string(), "de".to_string()];
        controller.reconfigure(&settings, provider);

        assert!(controller.has_credential());
        let codes: Vec<String> = controller.language_options().into_iter().map(|o| o.code).collect();
        assert_eq!(codes, vec!["en", "de"]);
    }

    #[test]
    fn test_default_target_follows_settings() {
        let mut settings = AppSettings::default();
        settings.preferences.default_target_lang = "es".to_string();
        let config = ControllerConfig::from_settings(&settings, None);
        assert_eq!(config.default_target.map(|l| l.code()), Some("es".to_string()));

        // Not in the catalog: fall back to the first offered language
        settings.preferences.default_target_lang = "de".to_string();
        settings.preferences.target_languages = vec!["fr".to_string(), "en".to_string()];
        let config = ControllerConfig::from_settings(&settings, None);
        assert_eq!(config.default_target.map(|l| l.code()), Some("fr".to_string()));

        settings.preferences.target_languages = vec![];
        assert_eq!(ControllerConfig::from_settings(&settings, None).default_target, None);
    }

    #[tokio::test]
    async fn test_default_language_option() {
        let provider = ScriptedProvider::with(vec![]);
        let controller = controller(provider, Some("sk-test"));

        let option = controller.default_language_option().unwrap();
        assert_eq!(option.code, "en");
        assert_eq!(option.name, "English");
    }

    #[tokio::test]
    async fn test_reset_clears_transcript() {
        let provider = ScriptedProvider::with(vec![ok("English")]);
        let controller = controller(provider, Some("sk-test"));
        controller.submit("Hello".to_string()).await.unwrap();

        controller.reset();
        assert!(controller.store().is_empty());
    }
}
