//! Turn an arbitrary webhook body into a [`NotificationEvent`].

use chrono::Local;
use serde_json::{Map, Value};

use moviepilot::types::is_truthy;
use moviepilot::{NotificationEvent, NotificationType};

pub const DEFAULT_TITLE: &str = "MoviePilot Notification";
pub const SOURCE: &str = "moviepilot_webhook";

const KNOWN_FIELDS: [&str; 5] = ["title", "text", "message", "type", "timestamp"];

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn present(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).filter(|v| !v.is_null()).map(text)
}

pub fn normalize(data: &Map<String, Value>) -> NotificationEvent {
    let title = present(data, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string());
    // `text` wins when non-empty, then `message`
    let message = data
        .get("text")
        .filter(|v| is_truthy(v))
        .map(text)
        .or_else(|| present(data, "message"))
        .unwrap_or_default();
    let kind = present(data, "type")
        .map(|t| NotificationType::normalize(&t))
        .unwrap_or_default();
    let timestamp = data
        .get("timestamp")
        .filter(|v| is_truthy(v))
        .map(text)
        .unwrap_or_else(|| Local::now().to_rfc3339());

    let extra: Map<String, Value> = data
        .iter()
        .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    NotificationEvent {
        kind,
        title,
        message,
        timestamp,
        source: SOURCE.to_string(),
        extra: (!extra.is_empty()).then_some(extra),
    }
}
