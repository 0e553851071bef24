//! Shared receiver state.

use tokio::sync::broadcast;

use moviepilot::NotificationEvent;

#[derive(Clone)]
pub struct AppState {
    /// Every accepted notification is re-emitted here.
    pub events: broadcast::Sender<NotificationEvent>,
    pub auth_token: Option<String>,
}

impl AppState {
    pub fn new(auth_token: Option<String>) -> Self {
        let (events, _) = broadcast::channel(64);
        AppState { events, auth_token }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }
}
