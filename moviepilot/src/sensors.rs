//! Named readings a display layer shows for one instance.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

use crate::notifier::Signals;
use crate::types::Snapshot;
use crate::util::bytes_to_gb;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Float(f64),
    Count(u64),
    Flag(bool),
    Text(String),
    Unknown,
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Float(v) => write!(f, "{v:.2}"),
            SensorValue::Count(v) => write!(f, "{v}"),
            SensorValue::Flag(true) => f.write_str("on"),
            SensorValue::Flag(false) => f.write_str("off"),
            SensorValue::Text(s) => f.write_str(s),
            SensorValue::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub key: &'static str,
    pub name: &'static str,
    pub value: SensorValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<&'static str, Value>,
}

impl SensorReading {
    fn new(key: &'static str, name: &'static str, value: SensorValue) -> Self {
        SensorReading {
            key,
            name,
            value,
            unit: None,
            attributes: BTreeMap::new(),
        }
    }

    fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    fn attr(mut self, key: &'static str, value: Value) -> Self {
        self.attributes.insert(key, value);
        self
    }
}

/// Activity state shown by the download/transfer message sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Active,
    Finished,
    Idle,
}

impl Activity {
    pub fn derive(current: bool, previous: Option<bool>) -> Self {
        if current {
            Activity::Active
        } else if previous == Some(true) {
            Activity::Finished
        } else {
            Activity::Idle
        }
    }

    fn download_label(self) -> &'static str {
        match self {
            Activity::Active => "下载中",
            Activity::Finished => "下载完成",
            Activity::Idle => "空闲",
        }
    }

    fn transfer_label(self) -> &'static str {
        match self {
            Activity::Active => "整理中",
            Activity::Finished => "整理完成",
            Activity::Idle => "空闲",
        }
    }
}

/// Every reading for the latest snapshot.
///
/// `online` is whether the last refresh succeeded; `previous` are the signals
/// observed before this snapshot.
pub fn readings(snapshot: &Snapshot, online: bool, previous: Signals) -> Vec<SensorReading> {
    let running_names: Vec<&str> = snapshot
        .tasks
        .iter()
        .filter(|t| t.is_running())
        .map(|t| t.name.as_str())
        .collect();
    let disk_free = if snapshot.disk_free_bytes > 0 {
        SensorValue::Float(bytes_to_gb(snapshot.disk_free_bytes))
    } else {
        SensorValue::Unknown
    };
    let download = Activity::derive(snapshot.is_downloading, previous.downloading);
    let transfer = Activity::derive(snapshot.is_transferring, previous.transferring);

    vec![
        SensorReading::new("cpu", "CPU使用率", SensorValue::Float(snapshot.cpu_percent)).unit("%"),
        SensorReading::new("memory", "内存使用率", SensorValue::Float(snapshot.memory_percent))
            .unit("%")
            .attr("used_gb", json!(bytes_to_gb(snapshot.memory_used_bytes))),
        SensorReading::new("disk", "磁盘使用率", SensorValue::Float(snapshot.disk_percent))
            .unit("%")
            .attr("total_storage", json!(bytes_to_gb(snapshot.disk_total_bytes)))
            .attr("used_storage", json!(bytes_to_gb(snapshot.disk_used_bytes)))
            .attr("free_storage", json!(bytes_to_gb(snapshot.disk_free_bytes))),
        SensorReading::new("disk_free", "磁盘可用空间", disk_free).unit("GB"),
        SensorReading::new(
            "downloader_speed",
            "下载速度",
            SensorValue::Float(snapshot.downloader_download_speed),
        )
        .unit("B/s")
        .attr(
            "total_downloaded",
            json!(bytes_to_gb(snapshot.downloader_total_downloaded)),
        ),
        SensorReading::new(
            "running_tasks",
            "运行中任务",
            SensorValue::Count(snapshot.running_tasks as u64),
        )
        .attr("task_names", json!(running_names)),
        SensorReading::new("movie_count", "电影数量", SensorValue::Count(snapshot.movie_count)),
        SensorReading::new("tv_count", "剧集数量", SensorValue::Count(snapshot.tv_count)),
        SensorReading::new("episode_count", "剧集集数", SensorValue::Count(snapshot.episode_count)),
        SensorReading::new("user_count", "用户数量", SensorValue::Count(snapshot.user_count)),
        SensorReading::new(
            "download_message",
            "下载通知",
            SensorValue::Text(download.download_label().into()),
        )
        .attr("download_speed", json!(snapshot.downloader_download_speed))
        .attr("total_downloaded", json!(snapshot.downloader_total_downloaded))
        .attr("is_downloading", json!(snapshot.is_downloading)),
        SensorReading::new(
            "transfer_message",
            "整理通知",
            SensorValue::Text(transfer.transfer_label().into()),
        )
        .attr("is_transferring", json!(snapshot.is_transferring))
        .attr("transfer_data", snapshot.transfer_data.clone()),
        // binary sensors
        SensorReading::new("online", "在线状态", SensorValue::Flag(online)),
        SensorReading::new(
            "tasks_running",
            "有任务运行",
            SensorValue::Flag(snapshot.running_tasks > 0),
        )
        .attr("running_count", json!(snapshot.running_tasks))
        .attr("pending_count", json!(snapshot.pending_tasks)),
        SensorReading::new("downloading", "下载中", SensorValue::Flag(snapshot.is_downloading))
            .attr("download_speed", json!(snapshot.downloader_download_speed))
            .attr("upload_speed", json!(snapshot.downloader_upload_speed)),
    ]
}
