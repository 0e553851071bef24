//! Webhook receiver for MoviePilot push notifications.

pub mod args;
pub mod notification;
pub mod state;
pub mod webhook;

pub use state::AppState;
pub use webhook::{router, webhook_url, DEFAULT_PORT, WEBHOOK_PATH};
