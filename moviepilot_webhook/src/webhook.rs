//! HTTP endpoint MoviePilot pushes notifications to.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use moviepilot::consts::NOTIFICATION_EVENT;

use crate::notification::normalize;
use crate::state::AppState;

pub const WEBHOOK_PATH: &str = "/api/moviepilot/webhook";
pub const DEFAULT_PORT: u16 = 8765;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(webhook_handler))
        .with_state(state)
}

/// Address to paste into MoviePilot's webhook settings.
pub fn webhook_url(base: &str) -> String {
    format!("{}{WEBHOOK_PATH}", base.trim_end_matches('/'))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

pub async fn webhook_handler(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if let Some(expected) = state.auth_token.as_ref() {
        match q.get("token") {
            Some(t) if t == expected => {}
            _ => {
                warn!("webhook request with missing or wrong token");
                return StatusCode::UNAUTHORIZED.into_response();
            }
        }
    }

    let data: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "invalid JSON in webhook request");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON format");
        }
    };
    let data = match data {
        Value::Object(map) => map,
        other => {
            warn!(body = %other, "webhook data is not a JSON object");
            return error_response(StatusCode::BAD_REQUEST, "Request data must be a JSON object");
        }
    };

    debug!(
        title = data.get("title").and_then(serde_json::Value::as_str).unwrap_or("N/A"),
        kind = data.get("type").and_then(serde_json::Value::as_str).unwrap_or("N/A"),
        "received MoviePilot webhook"
    );

    let event = normalize(&data);
    info!(kind = %event.kind, title = %event.title, "webhook notification received");
    // no subscribers is fine
    let _ = state.events.send(event);

    Json(json!({
        "success": true,
        "message": "Notification received and processed",
        "event_fired": NOTIFICATION_EVENT,
    }))
    .into_response()
}
