//! Types that mirror the MoviePilot dashboard API, plus the flattened snapshot.
//!
//! The server is not strict about shapes: numbers arrive as strings, arrays come
//! back short, objects come back as error text. Each endpoint type therefore owns
//! its parsing contract through [`FromPayload`] and falls back to its zero value
//! instead of failing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::consts::*;

/// The remote resources the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Cpu,
    Memory,
    Storage,
    Network,
    Statistics,
    Downloader,
    Schedule,
    TransferNow,
    Message,
}

impl Endpoint {
    /// The eight endpoints a dashboard refresh fans out to.
    pub const DASHBOARD: [Endpoint; 8] = [
        Endpoint::Cpu,
        Endpoint::Memory,
        Endpoint::Storage,
        Endpoint::Network,
        Endpoint::Statistics,
        Endpoint::Downloader,
        Endpoint::Schedule,
        Endpoint::TransferNow,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Cpu => API_ENDPOINT_CPU,
            Endpoint::Memory => API_ENDPOINT_MEMORY,
            Endpoint::Storage => API_ENDPOINT_STORAGE,
            Endpoint::Network => API_ENDPOINT_NETWORK,
            Endpoint::Statistics => API_ENDPOINT_STATISTIC,
            Endpoint::Downloader => API_ENDPOINT_DOWNLOADER,
            Endpoint::Schedule => API_ENDPOINT_SCHEDULE,
            Endpoint::TransferNow => API_ENDPOINT_TRANSFER_NOW,
            Endpoint::Message => API_ENDPOINT_MESSAGE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Cpu => "cpu",
            Endpoint::Memory => "memory",
            Endpoint::Storage => "storage",
            Endpoint::Network => "network",
            Endpoint::Statistics => "statistics",
            Endpoint::Downloader => "downloader",
            Endpoint::Schedule => "schedule",
            Endpoint::TransferNow => "transfer_now",
            Endpoint::Message => "message",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsing contract shared by all dashboard endpoint results.
pub trait FromPayload: Default + Sized {
    const ENDPOINT: Endpoint;

    /// Strict parse; `None` means the payload had the wrong shape.
    fn parse(payload: &Value) -> Option<Self>;

    /// Lenient parse used by the client: wrong shapes are logged and defaulted.
    fn from_payload(payload: &Value) -> Self {
        Self::parse(payload).unwrap_or_else(|| {
            warn!(
                endpoint = %Self::ENDPOINT,
                payload = %truncate(payload),
                "unexpected payload shape, using defaults"
            );
            Self::default()
        })
    }
}

// ---------- lenient JSON helpers ----------

fn truncate(payload: &Value) -> String {
    let s = payload.to_string();
    if s.chars().count() <= 200 {
        s
    } else {
        s.chars().take(200).collect::<String>() + "..."
    }
}

/// Numbers and numeric strings; everything else (and non-finite values) is `None`.
pub(crate) fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Non-negative integer counts; negatives clamp to zero.
pub(crate) fn count(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    number(v).map(|n| if n > 0.0 { n as u64 } else { 0 })
}

fn field_f64(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key).and_then(number).unwrap_or(0.0)
}

fn field_count(obj: &Map<String, Value>, key: &str) -> u64 {
    obj.get(key).and_then(count).unwrap_or(0)
}

fn field_text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Truthiness as the server's own clients see it: null, false, 0, "" and empty
/// containers are false.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ---------- endpoint results ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    /// 0..=100, not clamped
    pub percent: f64,
}

impl FromPayload for CpuUsage {
    const ENDPOINT: Endpoint = Endpoint::Cpu;

    fn parse(payload: &Value) -> Option<Self> {
        // A bare number; strings are not accepted here.
        payload.as_f64().map(|percent| CpuUsage { percent })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used_bytes: u64,
    pub percent: f64,
}

impl FromPayload for MemoryUsage {
    const ENDPOINT: Endpoint = Endpoint::Memory;

    // [used_bytes, percent]
    fn parse(payload: &Value) -> Option<Self> {
        match payload.as_array()?.as_slice() {
            [used, percent, ..] => Some(MemoryUsage {
                used_bytes: count(used).unwrap_or(0),
                percent: number(percent).unwrap_or(0.0),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
}

impl StorageUsage {
    pub fn from_totals(total_bytes: u64, used_bytes: u64) -> Self {
        let percent = if total_bytes > 0 {
            used_bytes as f64 * 100.0 / total_bytes as f64
        } else {
            0.0
        };
        StorageUsage {
            total_bytes,
            used_bytes,
            free_bytes: total_bytes.saturating_sub(used_bytes),
            percent,
        }
    }
}

impl FromPayload for StorageUsage {
    const ENDPOINT: Endpoint = Endpoint::Storage;

    // {"total_storage": n, "used_storage": n}
    fn parse(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;
        Some(StorageUsage::from_totals(
            field_count(obj, "total_storage"),
            field_count(obj, "used_storage"),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkUsage {
    /// bytes/s
    pub upload_speed: f64,
    /// bytes/s
    pub download_speed: f64,
}

impl FromPayload for NetworkUsage {
    const ENDPOINT: Endpoint = Endpoint::Network;

    // [upload, download]
    fn parse(payload: &Value) -> Option<Self> {
        match payload.as_array()?.as_slice() {
            [up, down, ..] => Some(NetworkUsage {
                upload_speed: number(up).unwrap_or(0.0),
                download_speed: number(down).unwrap_or(0.0),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub movie_count: u64,
    pub tv_count: u64,
    pub episode_count: u64,
    pub user_count: u64,
}

impl FromPayload for Statistics {
    const ENDPOINT: Endpoint = Endpoint::Statistics;

    fn parse(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;
        Some(Statistics {
            movie_count: field_count(obj, "movie_count"),
            tv_count: field_count(obj, "tv_count"),
            episode_count: field_count(obj, "episode_count"),
            user_count: field_count(obj, "user_count"),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloaderInfo {
    pub download_speed: f64,
    pub upload_speed: f64,
    /// cumulative bytes downloaded
    pub download_size: u64,
    /// cumulative bytes uploaded
    pub upload_size: u64,
    pub free_space: u64,
}

impl FromPayload for DownloaderInfo {
    const ENDPOINT: Endpoint = Endpoint::Downloader;

    fn parse(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;
        Some(DownloaderInfo {
            download_speed: field_f64(obj, "download_speed"),
            upload_speed: field_f64(obj, "upload_speed"),
            download_size: field_count(obj, "download_size"),
            upload_size: field_count(obj, "upload_size"),
            free_space: field_count(obj, "free_space"),
        })
    }
}

/// One scheduled job as listed by the schedule endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub status: String,
    pub next_run: String,
}

impl Task {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Task {
            id: field_text(obj, "id"),
            name: field_text(obj, "name"),
            provider: field_text(obj, "provider"),
            status: field_text(obj, "status"),
            next_run: field_text(obj, "next_run"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == STATUS_RUNNING
    }

    pub fn is_waiting(&self) -> bool {
        self.status == STATUS_WAITING
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTasks(pub Vec<Task>);

impl FromPayload for ScheduledTasks {
    const ENDPOINT: Endpoint = Endpoint::Schedule;

    fn parse(payload: &Value) -> Option<Self> {
        let items = payload.as_array()?;
        let tasks = items
            .iter()
            .filter_map(|item| match item.as_object() {
                Some(obj) => Some(Task::from_object(obj)),
                None => {
                    warn!(entry = %item, "skipping non-object schedule entry");
                    None
                }
            })
            .collect();
        Some(ScheduledTasks(tasks))
    }
}

/// Current transfer (library organisation) state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferNow {
    pub success: bool,
    pub message: Option<String>,
    /// Opaque payload; empty when nothing is being transferred.
    pub data: Value,
}

impl Default for TransferNow {
    fn default() -> Self {
        TransferNow {
            success: false,
            message: None,
            data: Value::Object(Map::new()),
        }
    }
}

impl TransferNow {
    pub fn is_active(&self) -> bool {
        is_truthy(&self.data)
    }
}

impl FromPayload for TransferNow {
    const ENDPOINT: Endpoint = Endpoint::TransferNow;

    fn parse(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;
        let data = match obj.get("data") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(v) => v.clone(),
        };
        Some(TransferNow {
            success: obj.get("success").is_some_and(is_truthy),
            message: obj.get("message").and_then(Value::as_str).map(str::to_owned),
            data,
        })
    }
}

// ---------- connection / system info ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub name: String,
    pub status: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tv_count: Option<u64>,
}

impl SystemInfo {
    pub fn unknown() -> Self {
        SystemInfo {
            version: "unknown".into(),
            movie_count: None,
            tv_count: None,
        }
    }
}

// ---------- notifications ----------

/// Notification categories the server understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    #[default]
    Manual,
    System,
    Download,
    Transfer,
    Subscribe,
    Media,
    Plugin,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::Manual,
        NotificationType::System,
        NotificationType::Download,
        NotificationType::Transfer,
        NotificationType::Subscribe,
        NotificationType::Media,
        NotificationType::Plugin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Manual => "Manual",
            NotificationType::System => "System",
            NotificationType::Download => "Download",
            NotificationType::Transfer => "Transfer",
            NotificationType::Subscribe => "Subscribe",
            NotificationType::Media => "Media",
            NotificationType::Plugin => "Plugin",
        }
    }

    /// Unknown values fall back to `Manual`.
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!(value = raw, "unknown notification type, using Manual");
            NotificationType::Manual
        })
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown notification type '{s}'"))
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as re-emitted locally under [`NOTIFICATION_EVENT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

// ---------- snapshot ----------

/// How much of a snapshot came from live data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "failed", rename_all = "snake_case")]
pub enum Coverage {
    /// Every endpoint answered.
    Full,
    /// These endpoints failed and report defaults.
    Partial(Vec<Endpoint>),
    /// Nothing answered; every field is a default.
    #[default]
    Empty,
}

impl Coverage {
    pub fn from_failures(failed: Vec<Endpoint>) -> Self {
        if failed.is_empty() {
            Coverage::Full
        } else if Endpoint::DASHBOARD.iter().all(|e| failed.contains(e)) {
            Coverage::Empty
        } else {
            Coverage::Partial(failed)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Coverage::Empty)
    }
}

/// One fully populated read of every dashboard metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used_bytes: u64,
    pub disk_percent: f64,
    pub disk_total_bytes: u64,
    pub disk_used_bytes: u64,
    pub disk_free_bytes: u64,

    pub network_upload_speed: f64,
    pub network_download_speed: f64,

    pub movie_count: u64,
    pub tv_count: u64,
    pub episode_count: u64,
    pub user_count: u64,

    pub downloader_download_speed: f64,
    pub downloader_upload_speed: f64,
    pub downloader_total_downloaded: u64,
    pub downloader_total_uploaded: u64,
    pub downloader_free_space: u64,

    pub tasks: Vec<Task>,
    pub running_tasks: usize,
    pub pending_tasks: usize,

    pub is_downloading: bool,
    pub is_transferring: bool,
    pub transfer_data: Value,

    pub coverage: Coverage,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// The all-default snapshot used when a refresh produced nothing.
    pub fn empty() -> Self {
        Snapshot {
            fetched_at: Utc::now(),
            ..Snapshot::default()
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            cpu_percent: 0.0,
            memory_percent: 0.0,
            memory_used_bytes: 0,
            disk_percent: 0.0,
            disk_total_bytes: 0,
            disk_used_bytes: 0,
            disk_free_bytes: 0,
            network_upload_speed: 0.0,
            network_download_speed: 0.0,
            movie_count: 0,
            tv_count: 0,
            episode_count: 0,
            user_count: 0,
            downloader_download_speed: 0.0,
            downloader_upload_speed: 0.0,
            downloader_total_downloaded: 0,
            downloader_total_uploaded: 0,
            downloader_free_space: 0,
            tasks: Vec::new(),
            running_tasks: 0,
            pending_tasks: 0,
            is_downloading: false,
            is_transferring: false,
            transfer_data: Value::Object(Map::new()),
            coverage: Coverage::Empty,
            fetched_at: DateTime::<Utc>::default(),
        }
    }
}
