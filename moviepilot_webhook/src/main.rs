//! moviepilot_webhook: receives MoviePilot push notifications over HTTP and
//! prints them as `moviepilot_notification` JSON lines.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use moviepilot::consts::NOTIFICATION_EVENT;
use moviepilot_webhook::args::Args;
use moviepilot_webhook::{router, webhook_url, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let port = args.port;
    let token = args.auth_token();
    let state = AppState::new(token.clone());

    let mut events = state.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ev) => match serde_json::to_string(&ev) {
                    Ok(data) => println!("{{\"event\":\"{NOTIFICATION_EVENT}\",\"data\":{data}}}"),
                    Err(err) => warn!(error = %err, "failed to serialize event"),
                },
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "event printer lagging"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let mut url = webhook_url(&format!("http://{addr}"));
    if token.is_some() {
        url.push_str("?token=***");
    }
    info!(%url, "MoviePilot webhook receiver registered");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
