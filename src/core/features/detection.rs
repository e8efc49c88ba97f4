use super::CapabilitySpec;
use crate::core::transcript::MessageEvent;
use crate::shared::types::Operation;

/// Identify the language a message is written in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDetection;

impl CapabilitySpec for LanguageDetection {
    fn operation(&self) -> Operation {
        Operation::Detect
    }

    fn system_prompt(&self) -> String {
        "You are a language detection tool. Identify the language of the provided text. \
         Respond with only the language name in English."
            .to_string()
    }

    fn max_tokens(&self) -> u32 {
        10
    }

    fn failure_context(&self) -> &'static str {
        "Error detecting language"
    }

    fn settle(&self, output: String) -> MessageEvent {
        MessageEvent::LanguageDetected(output)
    }
}
