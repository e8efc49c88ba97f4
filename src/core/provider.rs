//! Outbound boundary to the language model.
//!
//! The controller only sees `CompletionProvider`; `openai` is the shipped
//! implementation for OpenAI-compatible chat-completion endpoints.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;
use crate::core::security::credential::ApiKey;

pub use openai::OpenAiProvider;

/// One system-instruction + user-text completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_text: String,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    Malformed(String),

    #[error("API response contained no text")]
    EmptyCompletion,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run the completion and return the raw answer text. A response without
    /// any answer is `EmptyCompletion`.
    async fn complete(
        &self,
        credential: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError>;
}
