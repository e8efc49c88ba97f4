use tokio::sync::broadcast;
use tracing::trace;
use super::events::AppEvent;

/// Number of events a slow subscriber may fall behind before it starts
/// missing them.
const EVENT_CAPACITY: usize = 256;

/// Fan-out of application events to whoever renders them.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit an application event to all subscribers
pub fn emit_event(bus: &EventBus, event: AppEvent) {
    // Having nobody listening (e.g. before the UI attaches) is not an error.
    if let Err(broadcast::error::SendError(event)) = bus.sender.send(event) {
        trace!(?event, "No subscribers for event");
    }
}
