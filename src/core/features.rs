//! Capability catalog with enum dispatch
//!
//! Each operation the provider can perform (detect, translate, summarize) is a
//! small descriptor: which instruction to send, how many tokens the answer may
//! use, and how the answer folds back into a message. `Capability` dispatches
//! statically over the three.

use enum_dispatch::enum_dispatch;
use crate::core::provider::CompletionRequest;
use crate::core::transcript::MessageEvent;
use crate::shared::types::Operation;

pub mod detection;
pub mod translator;
pub mod summarizer;
pub mod text_analyser_logic;

pub use detection::LanguageDetection;
pub use summarizer::Summarization;
pub use translator::Translation;

#[enum_dispatch]
pub trait CapabilitySpec: Send + Sync {
    fn operation(&self) -> Operation;

    /// System instruction sent ahead of the user's text
    fn system_prompt(&self) -> String;

    /// Output token budget for the completion
    fn max_tokens(&self) -> u32;

    /// Prefix of the user-facing error when the request fails
    fn failure_context(&self) -> &'static str;

    /// Fold a successful (already trimmed) provider answer into a message event
    fn settle(&self, output: String) -> MessageEvent;
}

#[enum_dispatch(CapabilitySpec)]
#[derive(Debug, Clone)]
pub enum Capability {
    Detection(LanguageDetection),
    Translation(Translation),
    Summarization(Summarization),
}

impl Capability {
    pub fn completion_request(&self, model: &str, text: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            system_prompt: self.system_prompt(),
            user_text: text.to_string(),
            max_tokens: self.max_tokens(),
        }
    }
}
