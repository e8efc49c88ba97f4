use super::CapabilitySpec;
use crate::core::transcript::MessageEvent;
use crate::shared::types::Operation;

/// Condense a long message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summarization;

impl CapabilitySpec for Summarization {
    fn operation(&self) -> Operation {
        Operation::Summarize
    }

    fn system_prompt(&self) -> String {
        "Summarize the following text in a concise manner, preserving key information:".to_string()
    }

    fn max_tokens(&self) -> u32 {
        300
    }

    fn failure_context(&self) -> &'static str {
        "Error summarizing text"
    }

    fn settle(&self, output: String) -> MessageEvent {
        MessageEvent::Summarized(output)
    }
}
