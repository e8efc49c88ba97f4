use std::sync::Mutex;
use keyring::Entry;
use tracing::{debug, info, warn};
use crate::shared::error::{AppError, AppResult};

const KEYRING_SERVICE: &str = "ai-text-processing";
const KEYRING_ACCOUNT: &str = "openai_api_key";

/// Environment variable that takes precedence over the stored key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const MASK: &str = "********";

/// The provider credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Surrounding whitespace is dropped; blank keys or keys containing
    /// whitespace or control characters are rejected.
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let key = raw.as_ref().trim();
        if key.is_empty() {
            return Err(AppError::Validation("API key is empty".to_string()));
        }
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AppError::Validation("API key contains invalid characters".to_string()));
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> &'static str {
        MASK
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey({})", MASK)
    }
}

/// Somewhere the single API key is persisted between runs.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> AppResult<Option<ApiKey>>;
    fn save(&self, key: &ApiKey) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

/// OS keyring backed store (Keychain, Secret Service, Credential Manager).
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> AppResult<Entry> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-blank, valid value of the override variable wins over the keyring.
fn key_from_env(value: Option<String>) -> Option<ApiKey> {
    let value = value?;
    match ApiKey::new(&value) {
        Ok(key) => Some(key),
        Err(_) if value.trim().is_empty() => None,
        Err(e) => {
            warn!(var = API_KEY_ENV, error = %e, "Ignoring invalid API key from environment");
            None
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> AppResult<Option<ApiKey>> {
        if let Some(key) = key_from_env(std::env::var(API_KEY_ENV).ok()) {
            debug!(var = API_KEY_ENV, "Using API key from environment");
            return Ok(Some(key));
        }

        match self.entry()?.get_password() {
            Ok(stored) => match ApiKey::new(stored) {
                Ok(key) => Ok(Some(key)),
                Err(e) => {
                    warn!(error = %e, "Stored API key is invalid, ignoring it");
                    Ok(None)
                }
            },
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &ApiKey) -> AppResult<()> {
        self.entry()?.set_password(key.expose())?;
        info!("API key saved to keyring");
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, for tests and hosts without a keyring.
#[derive(Default)]
pub struct MemoryCredentialStore {
    key: Mutex<Option<ApiKey>>,
}

impl MemoryCredentialStore {
    pub fn new(key: Option<ApiKey>) -> Self {
        Self { key: Mutex::new(key) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ApiKey>> {
        match self.key.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> AppResult<Option<ApiKey>> {
        Ok(self.slot().clone())
    }

    fn save(&self, key: &ApiKey) -> AppResult<()> {
        *self.slot() = Some(key.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_validation() {
        assert_eq!(ApiKey::new("  sk-abc123 \n").unwrap().expose(), "sk-abc123");
        assert!(matches!(ApiKey::new("   "), Err(AppError::Validation(_))));
        assert!(matches!(ApiKey::new("sk abc"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-value").unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("secret"));
        assert_eq!(printed, "ApiKey(********)");
    }

    #[test]
    fn test_env_override() {
        assert_eq!(key_from_env(None), None);
        assert_eq!(key_from_env(Some("  ".to_string())), None);
        assert_eq!(key_from_env(Some("bad key".to_string())), None);
        assert_eq!(
            key_from_env(Some("sk-env".to_string())),
            Some(ApiKey::new("sk-env").unwrap())
        );
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.load().unwrap(), None);

        let key = ApiKey::new("sk-mem").unwrap();
        store.save(&key).unwrap();
        assert_eq!(store.load().unwrap(), Some(key));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
