//! Transcript commands
//!
//! Thin wrappers over the request lifecycle controller.

use tracing::debug;
use super::CommandResult;
use crate::shared::error::AppError;
use crate::shared::types::{LanguageOption, Message};
use crate::AppState;

/// Append `text` to the transcript and detect its language.
pub async fn submit_text(state: &AppState, text: String) -> CommandResult<Message> {
    debug!(len = text.len(), "submit_text");
    state.controller.submit(text).await
}

/// Re-run language detection, e.g. after a failed first attempt.
pub async fn detect_language(state: &AppState, id: String) -> CommandResult<Message> {
    let result = state.controller.detect(&id).await;
    settled(state, &id, result)
}

pub async fn translate_message(
    state: &AppState,
    id: String,
    target_lang: String,
) -> CommandResult<Message> {
    debug!(%id, %target_lang, "translate_message");
    let result = state.controller.translate(&id, &target_lang).await;
    settled(state, &id, result)
}

pub async fn summarize_message(state: &AppState, id: String) -> CommandResult<Message> {
    debug!(%id, "summarize_message");
    let result = state.controller.summarize(&id).await;
    settled(state, &id, result)
}

pub fn get_transcript(state: &AppState) -> Vec<Message> {
    state.controller.store().messages()
}

pub fn can_summarize(state: &AppState, id: String) -> CommandResult<bool> {
    state.controller.can_summarize(&id)
}

pub fn get_language_options(state: &AppState) -> Vec<LanguageOption> {
    state.controller.language_options()
}

/// Language the translate picker opens on
pub fn get_default_language(state: &AppState) -> Option<LanguageOption> {
    state.controller.default_language_option()
}

pub fn reset_session(state: &AppState) {
    state.controller.reset();
}

/// Returns false when `id` is no longer the visible notification.
pub fn dismiss_notification(state: &AppState, id: String) -> bool {
    state.controller.notifications().dismiss(&id)
}

fn current(state: &AppState, id: &str) -> CommandResult<Message> {
    state
        .controller
        .store()
        .get(id)
        .ok_or_else(|| AppError::MessageNotFound(id.to_string()))
}

/// Provider failures live on the message, so hand the message back. Anything
/// rejected before a request started is returned as the error.
fn settled(
    state: &AppState,
    id: &str,
    result: CommandResult<String>,
) -> CommandResult<Message> {
    match result {
        Ok(_) | Err(AppError::Provider(_)) => current(state, id),
        Err(e) => Err(e),
    }
}
