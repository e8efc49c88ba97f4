//! Message state transitions
//!
//! Every change to a message goes through `reduce`, so the store can apply a
//! settlement atomically regardless of which request produced it.

use crate::core::features::translator::types::TargetLanguage;
use crate::shared::types::{Message, MessageStatus, Operation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    /// A request for `operation` was issued
    Started(Operation),
    LanguageDetected(String),
    Translated { language: TargetLanguage, text: String },
    Summarized(String),
    Failed { operation: Operation, message: String },
}

/// Apply one event to a message. `text` is never touched, and a settlement
/// only writes the fields of the operation that just ran.
pub fn reduce(mut message: Message, event: &MessageEvent) -> Message {
    match event {
        MessageEvent::Started(operation) => {
            message.status = MessageStatus::Processing { operation: *operation };
            return message;
        }
        MessageEvent::LanguageDetected(label) => {
            message.detected_language = Some(label.clone());
            message.error = None;
        }
        MessageEvent::Translated { language, text } => {
            message.translated_text = Some(text.clone());
            message.translation_language = Some(language.code());
            message.error = None;
        }
        MessageEvent::Summarized(text) => {
            message.summarized_text = Some(text.clone());
            message.error = None;
        }
        MessageEvent::Failed { message: error, .. } => {
            message.error = Some(error.clone());
        }
    }
    message.status = MessageStatus::Settled;
    message
}
