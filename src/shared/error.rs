use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the presentation layer.
///
/// Serialized as `{ "type": ..., "message": ... }` so the UI can branch on the
/// kind (e.g. open the settings dialog on `MissingCredential`) without parsing
/// the display string.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("API key is missing. Please configure it in settings.")]
    MissingCredential,

    #[error("Unsupported: {0}")]
    UnsupportedCapability(String),

    #[error("{0}")]
    Provider(String),

    #[error("Please enter some text first.")]
    EmptyInput,

    #[error("Message {0} is still processing")]
    RecordBusy(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("A message is already being submitted")]
    SubmissionInFlight,

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("System Error: {0}")]
    System(String),
}

impl AppError {
    /// True when the user has to fix their configuration rather than retry.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::MissingCredential)
    }

    /// Input problems are shown as a transient notification instead of being
    /// attached to a message.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyInput | AppError::UnsupportedCapability(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

impl From<keyring::Error> for AppError {
    fn from(err: keyring::Error) -> Self {
        AppError::System(format!("Keyring error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
