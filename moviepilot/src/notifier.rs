//! Edge detection on the downloading/transferring signals.
//!
//! The notifier only remembers the two booleans of the previous snapshot. The
//! first observation initialises that memory without firing anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::NOTIFICATION_EVENT;
use crate::types::{NotificationEvent, NotificationType, Snapshot};
use crate::util::{format_size, format_speed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Download,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Started,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    pub edge: Edge,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl TransitionEvent {
    fn new(kind: TransitionKind, edge: Edge, message: String) -> Self {
        let title = match (kind, edge) {
            (TransitionKind::Download, Edge::Started) => "📥 开始下载",
            (TransitionKind::Download, Edge::Finished) => "✅ 下载完成",
            (TransitionKind::Transfer, Edge::Started) => "📁 开始整理",
            (TransitionKind::Transfer, Edge::Finished) => "✅ 整理完成",
        };
        TransitionEvent {
            kind,
            edge,
            title: title.to_string(),
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self.kind {
            TransitionKind::Download => NotificationType::Download,
            TransitionKind::Transfer => NotificationType::Transfer,
        }
    }

    /// The event as published under [`NOTIFICATION_EVENT`].
    pub fn to_notification(&self) -> NotificationEvent {
        NotificationEvent {
            kind: self.notification_type(),
            title: self.title.clone(),
            message: self.message.clone(),
            timestamp: self.timestamp.to_rfc3339(),
            source: "moviepilot".into(),
            extra: None,
        }
    }

    pub fn event_name(&self) -> &'static str {
        NOTIFICATION_EVENT
    }
}

/// Pure edge function: `None` (never observed) never fires.
pub fn detect_edge(previous: Option<bool>, current: bool) -> Option<Edge> {
    match (previous, current) {
        (Some(false), true) => Some(Edge::Started),
        (Some(true), false) => Some(Edge::Finished),
        _ => None,
    }
}

/// Last observed value of both signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub downloading: Option<bool>,
    pub transferring: Option<bool>,
}

#[derive(Debug, Default)]
pub struct StateChangeNotifier {
    last: Signals,
}

impl StateChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Signals {
        self.last
    }

    /// Compare against the previous snapshot, emit 0..=2 events, then remember
    /// the current values unconditionally.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Vec<TransitionEvent> {
        let mut events = Vec::new();

        if let Some(edge) = detect_edge(self.last.downloading, snapshot.is_downloading) {
            let message = match edge {
                Edge::Started => format!(
                    "下载速度: {}",
                    format_speed(snapshot.downloader_download_speed)
                ),
                Edge::Finished => format!(
                    "累计下载: {}",
                    format_size(snapshot.downloader_total_downloaded as f64)
                ),
            };
            events.push(TransitionEvent::new(TransitionKind::Download, edge, message));
        }

        if let Some(edge) = detect_edge(self.last.transferring, snapshot.is_transferring) {
            let message = match edge {
                Edge::Started => "正在整理文件到媒体库...".to_string(),
                Edge::Finished => format!(
                    "媒体库: 电影 {} 部, 剧集 {} 部",
                    snapshot.movie_count, snapshot.tv_count
                ),
            };
            events.push(TransitionEvent::new(TransitionKind::Transfer, edge, message));
        }

        self.last = Signals {
            downloading: Some(snapshot.is_downloading),
            transferring: Some(snapshot.is_transferring),
        };
        events
    }
}
