use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The three things the provider can do with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Operation {
    Detect,
    Translate,
    Summarize,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Detect => "detect",
            Operation::Translate => "translate",
            Operation::Summarize => "summarize",
        };
        f.write_str(name)
    }
}

/// Where a message is in its request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "camelCase")]
#[ts(export)]
pub enum MessageStatus {
    /// Just appended, no request issued yet
    Pending,
    Processing { operation: Operation },
    Settled,
}

/// One submitted text and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Message {
    pub id: String,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub detected_language: Option<String>,
    pub translated_text: Option<String>,
    /// ISO 639-1 code of `translated_text`
    pub translation_language: Option<String>,
    pub summarized_text: Option<String>,
    pub error: Option<String>,
    pub status: MessageStatus,
}

impl Message {
    pub fn new(text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            created_at: Utc::now(),
            detected_language: None,
            translated_text: None,
            translation_language: None,
            summarized_text: None,
            error: None,
            status: MessageStatus::Pending,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.status, MessageStatus::Processing { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient toast shown above the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub level: NotificationLevel,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            level,
            created_at: Utc::now(),
        }
    }
}

/// Entry of the target-language picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}
