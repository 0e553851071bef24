//! Endpoint paths, defaults and the literal values the server speaks.

use std::time::Duration;

pub const DEFAULT_NAME: &str = "MoviePilot";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// Refresh interval bounds (seconds)
pub const DEFAULT_SCAN_INTERVAL: u64 = 30;
pub const MIN_SCAN_INTERVAL: u64 = 10;
pub const MAX_SCAN_INTERVAL: u64 = 300;

pub const USER_AGENT: &str = concat!("moviepilot-rs/", env!("CARGO_PKG_VERSION"));

pub const API_ENDPOINT_MESSAGE: &str = "/api/v1/message/";
pub const API_ENDPOINT_CPU: &str = "/api/v1/dashboard/cpu2";
pub const API_ENDPOINT_MEMORY: &str = "/api/v1/dashboard/memory2";
pub const API_ENDPOINT_STORAGE: &str = "/api/v1/dashboard/storage2";
pub const API_ENDPOINT_NETWORK: &str = "/api/v1/dashboard/network2";
pub const API_ENDPOINT_STATISTIC: &str = "/api/v1/dashboard/statistic2";
pub const API_ENDPOINT_DOWNLOADER: &str = "/api/v1/dashboard/downloader2";
pub const API_ENDPOINT_SCHEDULE: &str = "/api/v1/dashboard/schedule2";
pub const API_ENDPOINT_TRANSFER_NOW: &str = "/api/v1/transfer/now";

// Task status literals as reported by the server (zh-CN locale). Matched exactly;
// a server running another locale reports zero running/pending tasks.
pub const STATUS_RUNNING: &str = "运行中";
pub const STATUS_WAITING: &str = "等待";
pub const STATUS_OK: &str = "OK";

/// Event name used for every notification re-emitted locally.
pub const NOTIFICATION_EVENT: &str = "moviepilot_notification";
pub const NOTIFY_DEFAULT_TITLE: &str = "Home Assistant";

pub const BYTES_PER_KB: f64 = 1024.0;
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
