//! Test doubles shared by unit tests across modules.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tokio::sync::Notify;
use crate::core::provider::{CompletionProvider, CompletionRequest, ProviderError};
use crate::core::security::credential::ApiKey;

/// Holds every request at the provider until the test lets it go.
#[derive(Default)]
struct Gate {
    entered: Notify,
    release: Notify,
}

/// Replays scripted answers and records every request it receives.
/// Runs out as `EmptyCompletion`.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    gate: Option<Gate>,
}

impl ScriptedProvider {
    pub fn with(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    /// Like `with`, but each request waits for `release` before answering.
    pub fn gated(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            gate: Some(Gate::default()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Resolves once a request is parked at the gate.
    pub async fn entered(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    /// Let one parked request answer.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.release.notify_one();
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        _credential: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyCompletion))
    }
}

pub fn ok(text: &str) -> Result<String, ProviderError> {
    Ok(text.to_string())
}
