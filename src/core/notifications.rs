use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};
use crate::shared::emit::{emit_event, EventBus};
use crate::shared::events::AppEvent;
use crate::shared::types::{Notification, NotificationLevel};

fn saturating_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Single-slot transient notification.
///
/// A new notification replaces the current one. Each one dismisses itself
/// after the configured delay unless it was dismissed or replaced earlier.
#[derive(Clone)]
pub struct NotificationCenter {
    current: Arc<Mutex<Option<Notification>>>,
    dismiss_after_ms: Arc<AtomicU64>,
    bus: EventBus,
}

impl NotificationCenter {
    pub fn new(bus: EventBus, dismiss_after: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            dismiss_after_ms: Arc::new(AtomicU64::new(saturating_millis(dismiss_after))),
            bus,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Notification>> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Notification mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn set_dismiss_after(&self, delay: Duration) {
        self.dismiss_after_ms.store(saturating_millis(delay), Ordering::Relaxed);
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms.load(Ordering::Relaxed))
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot().clone()
    }

    pub fn show(&self, message: impl Into<String>, level: NotificationLevel) -> Notification {
        let notification = Notification::new(message, level);
        *self.slot() = Some(notification.clone());
        debug!(id = %notification.id, message = %notification.message, "Notification shown");
        emit_event(&self.bus, AppEvent::NotificationShown(notification.clone()));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                let id = notification.id.clone();
                let delay = self.dismiss_after();
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    center.dismiss(&id);
                });
            }
            Err(_) => warn!("No async runtime, notification will not auto-dismiss"),
        }

        notification
    }

    /// Dismiss `id` if it is still the one showing. Returns whether it was.
    pub fn dismiss(&self, id: &str) -> bool {
        {
            let mut slot = self.slot();
            match slot.as_ref() {
                Some(current) if current.id == id => *slot = None,
                _ => return false,
            }
        }
        debug!(%id, "Notification dismissed");
        emit_event(&self.bus, AppEvent::NotificationDismissed(id.to_string()));
        true
    }
}
