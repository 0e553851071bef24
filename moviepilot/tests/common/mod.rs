//! In-process mock of the MoviePilot REST API for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use moviepilot::consts::*;
use moviepilot::{ClientConfig, MoviePilotClient};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub enum MockReply {
    Json(Value),
    Status(u16),
    Text(String),
    /// Plain text served with an `application/json` content type.
    MislabeledJson(String),
    Delay(Duration, Value),
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, MockReply>>>,
    posted: Arc<Mutex<Vec<Value>>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockServer {
    /// Serve the healthy end-to-end dashboard on an ephemeral port.
    pub async fn start() -> Self {
        let state = MockState::default();
        *state.routes.lock().unwrap() = healthy_routes();

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        MockServer { addr, state }
    }

    pub fn set(&self, method: Method, path: &str, reply: MockReply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), reply);
    }

    pub fn posted(&self) -> Vec<Value> {
        self.state.posted.lock().unwrap().clone()
    }

    pub fn config(&self, token: &str) -> ClientConfig {
        ClientConfig::new("127.0.0.1", self.addr.port(), token)
    }

    pub fn client(&self) -> MoviePilotClient {
        MoviePilotClient::new(&self.config(TOKEN)).unwrap()
    }
}

pub fn healthy_routes() -> HashMap<String, MockReply> {
    let get = |path: &str, v: Value| (format!("GET {path}"), MockReply::Json(v));
    HashMap::from([
        get(API_ENDPOINT_MESSAGE, json!({ "status": "OK" })),
        get(API_ENDPOINT_CPU, json!(42.5)),
        get(API_ENDPOINT_MEMORY, json!([8_000_000_000u64, 55.2])),
        get(
            API_ENDPOINT_STORAGE,
            json!({ "total_storage": 1_000_000_000_000u64, "used_storage": 400_000_000_000u64 }),
        ),
        get(API_ENDPOINT_NETWORK, json!([100, 500])),
        get(
            API_ENDPOINT_STATISTIC,
            json!({ "movie_count": 120, "tv_count": 30, "episode_count": 900, "user_count": 2 }),
        ),
        get(
            API_ENDPOINT_DOWNLOADER,
            json!({
                "download_speed": 1_000_000,
                "upload_speed": 2048,
                "download_size": 5_242_880,
                "upload_size": 1024,
                "free_space": 2_147_483_648u64
            }),
        ),
        get(
            API_ENDPOINT_SCHEDULE,
            json!([
                { "id": "1", "name": "订阅刷新", "provider": "core", "status": "运行中", "next_run": "" },
                { "id": "2", "name": "站点签到", "provider": "core", "status": "等待", "next_run": "10分钟" },
                { "id": "3", "name": "缓存清理", "provider": "core", "status": "等待", "next_run": "1小时" }
            ]),
        ),
        get(
            API_ENDPOINT_TRANSFER_NOW,
            json!({ "success": true, "data": null }),
        ),
        (
            format!("POST {API_ENDPOINT_MESSAGE}"),
            MockReply::Json(json!({ "success": true })),
        ),
    ])
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if query.get("token").map(String::as_str) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if method == Method::POST {
        if let Ok(v) = serde_json::from_slice::<Value>(&body) {
            state.posted.lock().unwrap().push(v);
        }
    }

    let key = format!("{method} {}", uri.path());
    let reply = state.routes.lock().unwrap().get(&key).cloned();
    match reply {
        None => StatusCode::NOT_FOUND.into_response(),
        Some(MockReply::Json(v)) => Json(v).into_response(),
        Some(MockReply::Status(code)) => {
            (StatusCode::from_u16(code).unwrap(), "internal failure").into_response()
        }
        Some(MockReply::Text(s)) => s.into_response(),
        Some(MockReply::MislabeledJson(s)) => {
            ([(header::CONTENT_TYPE, "application/json")], s).into_response()
        }
        Some(MockReply::Delay(d, v)) => {
            tokio::time::sleep(d).await;
            Json(v).into_response()
        }
    }
}
