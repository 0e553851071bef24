//! Snapshot aggregation: flatten the eight endpoint results and derive signals.

use chrono::Utc;
use tracing::warn;

use crate::error::ApiResult;
use crate::types::{
    Coverage, DownloaderInfo, Endpoint, MemoryUsage, NetworkUsage, Snapshot, Statistics,
    StorageUsage, Task, TransferNow,
};

/// Raw per-endpoint results of one refresh, after failures were defaulted.
#[derive(Debug, Clone, Default)]
pub struct DashboardParts {
    pub cpu_percent: f64,
    pub memory: MemoryUsage,
    pub storage: StorageUsage,
    pub network: NetworkUsage,
    pub statistics: Statistics,
    pub downloader: DownloaderInfo,
    pub tasks: Vec<Task>,
    pub transfer: TransferNow,
    /// Endpoints whose request failed.
    pub failed: Vec<Endpoint>,
}

/// Resolve one fan-out branch: errors are logged, recorded and replaced by the
/// endpoint's default.
pub fn settle<T: Default>(endpoint: Endpoint, result: ApiResult<T>, failed: &mut Vec<Endpoint>) -> T {
    match result {
        Ok(v) => v,
        Err(err) => {
            warn!(%endpoint, error = %err, "dashboard endpoint failed, using defaults");
            failed.push(endpoint);
            T::default()
        }
    }
}

/// (running, pending) by exact status match.
pub fn count_tasks(tasks: &[Task]) -> (usize, usize) {
    tasks.iter().fold((0, 0), |(running, pending), t| {
        if t.is_running() {
            (running + 1, pending)
        } else if t.is_waiting() {
            (running, pending + 1)
        } else {
            (running, pending)
        }
    })
}

impl DashboardParts {
    pub fn into_snapshot(self) -> Snapshot {
        let (running_tasks, pending_tasks) = count_tasks(&self.tasks);
        let is_downloading = self.downloader.download_speed > 0.0;
        let is_transferring = self.transfer.is_active();

        Snapshot {
            cpu_percent: self.cpu_percent,
            memory_percent: self.memory.percent,
            memory_used_bytes: self.memory.used_bytes,
            disk_percent: self.storage.percent,
            disk_total_bytes: self.storage.total_bytes,
            disk_used_bytes: self.storage.used_bytes,
            disk_free_bytes: self.storage.free_bytes,

            network_upload_speed: self.network.upload_speed,
            network_download_speed: self.network.download_speed,

            movie_count: self.statistics.movie_count,
            tv_count: self.statistics.tv_count,
            episode_count: self.statistics.episode_count,
            user_count: self.statistics.user_count,

            downloader_download_speed: self.downloader.download_speed,
            downloader_upload_speed: self.downloader.upload_speed,
            downloader_total_downloaded: self.downloader.download_size,
            downloader_total_uploaded: self.downloader.upload_size,
            downloader_free_space: self.downloader.free_space,

            tasks: self.tasks,
            running_tasks,
            pending_tasks,

            is_downloading,
            is_transferring,
            transfer_data: self.transfer.data,

            coverage: Coverage::from_failures(self.failed),
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;

    fn task(status: &str) -> Task {
        Task {
            status: status.into(),
            ..Task::default()
        }
    }

    #[test]
    fn download_signal_boundary() {
        let mut parts = DashboardParts::default();
        parts.downloader.download_speed = 0.0;
        assert!(!parts.clone().into_snapshot().is_downloading);

        parts.downloader.download_speed = 0.1;
        assert!(parts.into_snapshot().is_downloading);
    }

    #[test]
    fn transfer_signal_follows_data() {
        let mut parts = DashboardParts::default();
        assert!(!parts.clone().into_snapshot().is_transferring);

        parts.transfer.data = json!({"path": "/downloads/Dune"});
        let snap = parts.into_snapshot();
        assert!(snap.is_transferring);
        assert_eq!(snap.transfer_data, json!({"path": "/downloads/Dune"}));
    }

    #[test]
    fn task_counts_use_exact_literals() {
        let tasks = vec![
            task("运行中"),
            task("运行中"),
            task("等待"),
            task("Running"),
            task(" 等待"),
            task(""),
        ];
        assert_eq!(count_tasks(&tasks), (2, 1));
    }

    #[test]
    fn failed_branch_is_defaulted_and_recorded() {
        let mut failed = Vec::new();
        let mem: MemoryUsage = settle(
            Endpoint::Memory,
            Err(ApiError::Connection("refused".into())),
            &mut failed,
        );
        let cpu = settle(Endpoint::Cpu, Ok(12.5), &mut failed);
        assert_eq!(mem, MemoryUsage::default());
        assert_eq!(cpu, 12.5);
        assert_eq!(failed, vec![Endpoint::Memory]);

        let snap = DashboardParts {
            cpu_percent: cpu,
            memory: mem,
            failed,
            ..DashboardParts::default()
        }
        .into_snapshot();
        assert_eq!(snap.coverage, Coverage::Partial(vec![Endpoint::Memory]));
        assert_eq!(snap.cpu_percent, 12.5);
    }
}
