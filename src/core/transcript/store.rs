use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use super::reducer::{reduce, MessageEvent};
use crate::shared::emit::{emit_event, EventBus};
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::AppEvent;
use crate::shared::types::{Message, Operation};

/// Append-only, in-memory list of the session's messages.
///
/// Cheap to clone; clones share the same messages. The lock is only ever held
/// for a single reducer step, never across an await point.
#[derive(Clone)]
pub struct TranscriptStore {
    messages: Arc<Mutex<Vec<Message>>>,
    bus: EventBus,
}

impl TranscriptStore {
    pub fn new(bus: EventBus) -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            bus,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Transcript mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Append a new pending message holding `text` exactly as given.
    pub fn append(&self, text: String) -> Message {
        let message = Message::new(text);
        let count = {
            let mut messages = self.lock();
            messages.push(message.clone());
            messages.len()
        };
        debug!(id = %message.id, count, "Appended message");
        emit_event(&self.bus, AppEvent::MessageAppended(message.clone()));
        message
    }

    /// All messages in submission order
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Message> {
        self.lock().iter().find(|m| m.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Mark `id` as processing `operation`, unless it already is.
    pub fn begin(&self, id: &str, operation: Operation) -> AppResult<Message> {
        self.apply_if_idle(id, MessageEvent::Started(operation))
    }

    /// Apply `event` only when no request is in flight for `id`.
    pub fn apply_if_idle(&self, id: &str, event: MessageEvent) -> AppResult<Message> {
        self.update(id, |current| {
            if current.is_processing() {
                return Err(AppError::RecordBusy(id.to_string()));
            }
            Ok(event)
        })
    }

    /// Apply `event` to `id` and publish the result.
    pub fn apply(&self, id: &str, event: MessageEvent) -> AppResult<Message> {
        self.update(id, |_| Ok(event))
    }

    fn update<F>(&self, id: &str, decide: F) -> AppResult<Message>
    where
        F: FnOnce(&Message) -> AppResult<MessageEvent>,
    {
        let updated = {
            let mut messages = self.lock();
            let slot = messages
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| AppError::MessageNotFound(id.to_string()))?;
            let event = decide(slot)?;
            let next = reduce(slot.clone(), &event);
            *slot = next.clone();
            next
        };
        emit_event(&self.bus, AppEvent::MessageUpdated(updated.clone()));
        Ok(updated)
    }

    /// Drop every message, starting a fresh session.
    pub fn clear(&self) {
        self.lock().clear();
        debug!("Transcript cleared");
        emit_event(&self.bus, AppEvent::TranscriptCleared);
    }
}
