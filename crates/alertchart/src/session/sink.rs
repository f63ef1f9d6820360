use std::time::{SystemTime, UNIX_EPOCH};

use alertchart_trigger::{NotificationSink, NotificationStore};

use crate::events::{DashboardEvent, EventBus};

/// Shows messages as dashboard toasts and persists them to a notification
/// store.
pub struct StoreSink<'a, S> {
    store: &'a mut S,
    bus: &'a mut EventBus,
}

impl<'a, S: NotificationStore> StoreSink<'a, S> {
    pub fn new(store: &'a mut S, bus: &'a mut EventBus) -> Self {
        Self { store, bus }
    }
}

impl<S: NotificationStore> NotificationSink for StoreSink<'_, S> {
    fn show(&mut self, message: &str) {
        self.bus.emit(DashboardEvent::Toast(message.to_string()));
    }

    fn persist(&mut self, user_id: &str, message: &str) {
        if let Err(e) = self.store.save_notification(user_id, message, unix_now()) {
            log::warn!("Failed to persist notification: {}", e);
        }
    }
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
