//! Translator capability
//!
//! Translates a message into one of the catalog's target languages.

pub mod types;

use super::CapabilitySpec;
use crate::core::transcript::MessageEvent;
use crate::shared::types::Operation;
use types::TargetLanguage;

#[derive(Debug, Clone, Copy)]
pub struct Translation {
    target: TargetLanguage,
}

impl Translation {
    pub fn new(target: TargetLanguage) -> Self {
        Self { target }
    }
}

impl CapabilitySpec for Translation {
    fn operation(&self) -> Operation {
        Operation::Translate
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a translator. Translate the following text to {}.",
            self.target.name()
        )
    }

    fn max_tokens(&self) -> u32 {
        1000
    }

    fn failure_context(&self) -> &'static str {
        "Error translating text"
    }

    fn settle(&self, output: String) -> MessageEvent {
        MessageEvent::Translated {
            language: self.target,
            text: output,
        }
    }
}
