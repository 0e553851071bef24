//! HTTP client for the MoviePilot REST API.
//!
//! Every call carries the API token as a `token` query parameter. Transport and
//! status failures are mapped onto [`ApiError`]; payload shape problems never are,
//! they are logged and defaulted by the endpoint types instead.

use std::time::Duration;

use reqwest::{header, Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::consts::*;
use crate::error::{ApiError, ApiResult};
use crate::overview::{settle, DashboardParts};
use crate::types::{
    is_truthy, ConnectionInfo, CpuUsage, DownloaderInfo, Endpoint, FromPayload, MemoryUsage,
    NetworkUsage, NotificationType, ScheduledTasks, Snapshot, Statistics, StorageUsage,
    SystemInfo, Task, TransferNow,
};

/// Connection parameters for one MoviePilot instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub token: String,
    pub timeout: Duration,
    /// Self-signed certificates are common on home servers; off by default.
    pub verify_tls: bool,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        ClientConfig {
            host: host.into(),
            port,
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            verify_tls: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the base address: explicit schemes are kept, otherwise https on 443.
pub fn base_url(host: &str, port: u16) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}:{port}")
    } else {
        let scheme = if port == 443 { "https" } else { "http" };
        format!("{scheme}://{host}:{port}")
    }
}

#[derive(Debug, Clone)]
pub struct MoviePilotClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl MoviePilotClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let base_url = base_url(&config.host, config.port);
        Url::parse(&base_url)
            .map_err(|e| ApiError::Api(format!("invalid MoviePilot address '{base_url}': {e}")))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| ApiError::Api(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %base_url, "MoviePilot client initialised");
        Ok(MoviePilotClient {
            http,
            base_url,
            token: config.token.clone(),
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single-request primitive behind every accessor.
    ///
    /// JSON bodies are decoded when the content type says so; a body that fails to
    /// decode (or is not labelled JSON) comes back as a string, and an empty body as
    /// `null`.
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "API request (token=***)");

        let mut req = self
            .http
            .request(method, &url)
            .query(&[("token", self.token.as_str())]);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| {
            let err = ApiError::from_transport(e, self.timeout);
            error!(path, error = %err, "API request failed");
            err
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            error!(path, "API authentication failed: token invalid or expired");
            return Err(ApiError::Auth(
                "Authentication failed. Please check your API token.".into(),
            ));
        }
        if status == StatusCode::NOT_FOUND {
            error!(path, "API endpoint not found");
            return Err(ApiError::Api(format!("API endpoint not found: {path}")));
        }
        if status.as_u16() >= 400 {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            warn!(path, status = status.as_u16(), body = %snippet, "API request rejected");
            return Err(ApiError::Api(format!(
                "API request failed: HTTP {} - {}",
                status.as_u16(),
                snippet
            )));
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout))?;

        if text.is_empty() {
            return Ok(Value::Null);
        }
        if !is_json {
            debug!(path, "non-JSON response");
            return Ok(Value::String(text));
        }
        match serde_json::from_str(&text) {
            Ok(v) => {
                debug!(path, "API response ok");
                Ok(v)
            }
            Err(e) => {
                // Some deployments mislabel plain text as JSON.
                warn!(path, error = %e, "failed to decode JSON response, returning text");
                Ok(Value::String(text))
            }
        }
    }

    async fn fetch<T: FromPayload>(&self) -> ApiResult<T> {
        let payload = self.request(Method::GET, T::ENDPOINT.path(), None).await?;
        Ok(T::from_payload(&payload))
    }

    // ---------- connectivity ----------

    /// Lightweight call that validates both reachability and the token.
    pub async fn test_connection(&self) -> ApiResult<ConnectionInfo> {
        let result = self.request(Method::GET, API_ENDPOINT_MESSAGE, None).await?;
        let ok = result
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s == STATUS_OK);
        if !ok {
            return Err(ApiError::Api("Unexpected response from MoviePilot".into()));
        }
        info!(base_url = %self.base_url, "MoviePilot connection test succeeded");
        Ok(ConnectionInfo {
            name: DEFAULT_NAME.into(),
            status: "connected".into(),
            endpoint: API_ENDPOINT_MESSAGE.into(),
        })
    }

    /// Version probe used when naming a configured instance. Never fails.
    pub async fn system_info(&self) -> SystemInfo {
        match self.fetch::<Statistics>().await {
            Ok(stats) => SystemInfo {
                version: "moviepilot V2".into(),
                movie_count: Some(stats.movie_count),
                tv_count: Some(stats.tv_count),
            },
            Err(err) => {
                warn!(error = %err, "failed to read system info");
                SystemInfo::unknown()
            }
        }
    }

    // ---------- dashboard accessors ----------

    pub async fn cpu_usage(&self) -> ApiResult<f64> {
        Ok(self.fetch::<CpuUsage>().await?.percent)
    }

    pub async fn memory_usage(&self) -> ApiResult<MemoryUsage> {
        self.fetch().await
    }

    pub async fn storage_usage(&self) -> ApiResult<StorageUsage> {
        self.fetch().await
    }

    pub async fn network_usage(&self) -> ApiResult<NetworkUsage> {
        self.fetch().await
    }

    pub async fn statistics(&self) -> ApiResult<Statistics> {
        self.fetch().await
    }

    pub async fn downloader_info(&self) -> ApiResult<DownloaderInfo> {
        self.fetch().await
    }

    pub async fn scheduled_tasks(&self) -> ApiResult<Vec<Task>> {
        Ok(self.fetch::<ScheduledTasks>().await?.0)
    }

    pub async fn transfer_now(&self) -> ApiResult<TransferNow> {
        self.fetch().await
    }

    /// Fetch all eight dashboard endpoints concurrently and build one snapshot.
    ///
    /// A failing endpoint contributes its defaults; the others still report. If the
    /// batch itself dies (a panic while composing), the empty snapshot is returned.
    pub async fn dashboard_overview(&self) -> Snapshot {
        let client = self.clone();
        match tokio::spawn(async move { client.collect_overview().await }).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "dashboard overview failed, returning empty snapshot");
                Snapshot::empty()
            }
        }
    }

    async fn collect_overview(&self) -> Snapshot {
        let (cpu, memory, storage, network, statistics, downloader, tasks, transfer) = tokio::join!(
            self.cpu_usage(),
            self.memory_usage(),
            self.storage_usage(),
            self.network_usage(),
            self.statistics(),
            self.downloader_info(),
            self.scheduled_tasks(),
            self.transfer_now(),
        );

        let mut failed = Vec::new();
        DashboardParts {
            cpu_percent: settle(Endpoint::Cpu, cpu, &mut failed),
            memory: settle(Endpoint::Memory, memory, &mut failed),
            storage: settle(Endpoint::Storage, storage, &mut failed),
            network: settle(Endpoint::Network, network, &mut failed),
            statistics: settle(Endpoint::Statistics, statistics, &mut failed),
            downloader: settle(Endpoint::Downloader, downloader, &mut failed),
            tasks: settle(Endpoint::Schedule, tasks, &mut failed),
            transfer: settle(Endpoint::TransferNow, transfer, &mut failed),
            failed,
        }
        .into_snapshot()
    }

    // ---------- notifications ----------

    /// Push a message to MoviePilot. `Ok(false)` means the server declined it.
    pub async fn send_notification(
        &self,
        title: &str,
        message: &str,
        kind: NotificationType,
    ) -> ApiResult<bool> {
        let body = json!({
            "title": title,
            "text": message,
            "type": kind.as_str(),
        });
        let result = self
            .request(Method::POST, API_ENDPOINT_MESSAGE, Some(&body))
            .await?;

        if result.get("success").is_some_and(is_truthy) {
            info!(title, "notification sent");
            Ok(true)
        } else {
            warn!(title, response = %result, "notification rejected");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_inferred_from_port() {
        assert_eq!(base_url("nas.local", 3000), "http://nas.local:3000");
        assert_eq!(base_url("nas.local", 443), "https://nas.local:443");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        assert_eq!(base_url("https://mp.example.com", 8443), "https://mp.example.com:8443");
        assert_eq!(base_url("http://10.0.0.2/", 443), "http://10.0.0.2:443");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = MoviePilotClient::new(&ClientConfig::new("bad host name", 3000, "t")).unwrap_err();
        assert!(matches!(err, ApiError::Api(_)));
    }
}
