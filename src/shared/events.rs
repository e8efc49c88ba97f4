use serde::{Deserialize, Serialize};
use ts_rs::TS;
use super::types::{Message, Notification};
use super::settings::AppSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
#[ts(export)]
pub enum AppEvent {
    #[serde(rename = "transcript://appended")]
    MessageAppended(Message),

    #[serde(rename = "transcript://updated")]
    MessageUpdated(Message),

    #[serde(rename = "transcript://cleared")]
    TranscriptCleared,

    #[serde(rename = "notification://shown")]
    NotificationShown(Notification),

    /// Carries the id of the dismissed notification
    #[serde(rename = "notification://dismissed")]
    NotificationDismissed(String),

    #[serde(rename = "settings://updated")]
    SettingsUpdated(AppSettings),
}
