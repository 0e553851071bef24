//! Webhook receiver over real HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};

use moviepilot::NotificationType;
use moviepilot_webhook::{router, AppState, WEBHOOK_PATH};

async fn serve(token: Option<&str>) -> (SocketAddr, AppState) {
    let state = AppState::new(token.map(str::to_string));
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn url(addr: SocketAddr) -> String {
    format!("http://{addr}{WEBHOOK_PATH}")
}

#[tokio::test]
async fn accepted_notification_is_re_emitted() {
    let (addr, state) = serve(None).await;
    let mut events = state.subscribe();

    let resp = reqwest::Client::new()
        .post(url(addr))
        .json(&json!({
            "title": "下载完成",
            "text": "The Matrix (1999)",
            "type": "Download",
            "season": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Notification received and processed",
            "event_fired": "moviepilot_notification"
        })
    );

    let ev = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ev.kind, NotificationType::Download);
    assert_eq!(ev.title, "下载完成");
    assert_eq!(ev.message, "The Matrix (1999)");
    assert_eq!(ev.source, "moviepilot_webhook");
    assert_eq!(ev.extra.unwrap()["season"], 1);
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let (addr, _state) = serve(None).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(addr))
        .header("content-type", "application/json")
        .body("{ nope")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "Invalid JSON format" }));

    let resp = client.post(url(addr)).json(&json!([1, 2])).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Request data must be a JSON object");
}

#[tokio::test]
async fn token_is_checked_when_configured() {
    let (addr, _state) = serve(Some("s3cret")).await;
    let client = reqwest::Client::new();

    let resp = client.post(url(addr)).json(&json!({})).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{}?token=wrong", url(addr)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{}?token=s3cret", url(addr)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn only_post_is_routed() {
    let (addr, _state) = serve(None).await;
    let resp = reqwest::get(url(addr)).await.unwrap();
    assert_eq!(resp.status(), 405);
}
