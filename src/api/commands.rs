//! Command modules, one per UI area.
//!
//! - `transcript`: submit text and run detect/translate/summarize on messages
//! - `settings`: settings persistence and the provider API key
//!
//! Every command returns [`CommandResult`]; `AppError` serializes as
//! `{ "type", "message" }` so the UI can branch on the kind of failure.

use crate::shared::error::AppError;

pub mod settings;
pub mod transcript;

pub type CommandResult<T> = Result<T, AppError>;
