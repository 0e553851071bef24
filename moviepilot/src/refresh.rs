//! Periodic refresh driver for one MoviePilot instance.
//!
//! A `Coordinator` owns the client and the notifier of exactly one instance. It
//! refreshes on a fixed interval, never overlapping, and publishes the latest
//! state on a `watch` channel and transition events on a `broadcast` channel.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::MoviePilotClient;
use crate::consts::{DEFAULT_SCAN_INTERVAL, MAX_SCAN_INTERVAL, MIN_SCAN_INTERVAL};
use crate::error::{ApiError, RefreshError};
use crate::notifier::{Signals, StateChangeNotifier, TransitionEvent};
use crate::types::{ConnectionInfo, Snapshot};

/// Validate a scan interval in seconds.
pub fn scan_interval(secs: Option<u64>) -> Result<Duration, RefreshError> {
    let secs = secs.unwrap_or(DEFAULT_SCAN_INTERVAL);
    if (MIN_SCAN_INTERVAL..=MAX_SCAN_INTERVAL).contains(&secs) {
        Ok(Duration::from_secs(secs))
    } else {
        Err(RefreshError::InvalidInterval(secs))
    }
}

/// Result of one successful refresh.
#[derive(Debug, Clone)]
pub struct Update {
    pub snapshot: Snapshot,
    pub events: Vec<TransitionEvent>,
    /// Signals as they were before this snapshot was observed.
    pub previous: Signals,
}

/// What subscribers see after every refresh attempt.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    pub last_update_success: bool,
    /// Last good update; kept across failed refreshes.
    pub latest: Option<Update>,
    pub last_error: Option<String>,
}

pub struct Coordinator {
    client: MoviePilotClient,
    notifier: StateChangeNotifier,
    interval: Duration,
    state_tx: watch::Sender<CoordinatorState>,
    events_tx: broadcast::Sender<TransitionEvent>,
    last_refresh: Option<Instant>,
}

impl Coordinator {
    pub fn new(client: MoviePilotClient, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(CoordinatorState::default());
        let (events_tx, _) = broadcast::channel(32);
        Coordinator {
            client,
            notifier: StateChangeNotifier::new(),
            interval,
            state_tx,
            events_tx,
            last_refresh: None,
        }
    }

    pub fn client(&self) -> &MoviePilotClient {
        &self.client
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TransitionEvent> {
        self.events_tx.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        self.state_tx.borrow().clone()
    }

    /// Validate the connection, then fetch the first snapshot.
    ///
    /// Auth failures are fatal; anything else means "not ready yet".
    pub async fn first_refresh(&mut self) -> Result<(ConnectionInfo, Update), RefreshError> {
        let info = self.client.test_connection().await.map_err(|err| match err {
            ApiError::Auth(_) => RefreshError::Auth(err),
            other => RefreshError::NotReady(other),
        })?;
        info!(name = %info.name, "connected to MoviePilot");
        let update = self.refresh().await?;
        Ok((info, update))
    }

    /// One refresh. A snapshot with no live data at all counts as a failed update:
    /// the notifier is not advanced and the previous good update is kept.
    pub async fn refresh(&mut self) -> Result<Update, RefreshError> {
        self.last_refresh = Some(Instant::now());
        let snapshot = self.client.dashboard_overview().await;

        if snapshot.coverage.is_empty() {
            let msg = "no dashboard endpoint answered".to_string();
            warn!("MoviePilot update failed: {msg}");
            self.state_tx.send_modify(|s| {
                s.last_update_success = false;
                s.last_error = Some(msg.clone());
            });
            return Err(RefreshError::UpdateFailed(msg));
        }

        let previous = self.notifier.signals();
        let events = self.notifier.observe(&snapshot);
        for event in &events {
            info!(
                kind = ?event.kind,
                edge = ?event.edge,
                title = %event.title,
                message = %event.message,
                "state change"
            );
            // no subscribers is fine
            let _ = self.events_tx.send(event.clone());
        }
        debug!(coverage = ?snapshot.coverage, "MoviePilot data updated");

        let update = Update {
            snapshot,
            events,
            previous,
        };
        self.state_tx.send_modify(|s| {
            s.last_update_success = true;
            s.latest = Some(update.clone());
            s.last_error = None;
        });
        Ok(update)
    }

    /// Refresh every interval until `shutdown` resolves. The first tick comes one
    /// interval after the previous refresh (immediately if there was none); slow
    /// refreshes delay the next tick instead of piling up.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let start = match self.last_refresh {
            Some(at) => at + self.interval,
            None => Instant::now(),
        };
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("refresh loop stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.refresh().await {
                        warn!(error = %err, "refresh failed, retrying next interval");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds() {
        assert_eq!(scan_interval(None).unwrap(), Duration::from_secs(30));
        assert_eq!(scan_interval(Some(10)).unwrap(), Duration::from_secs(10));
        assert_eq!(scan_interval(Some(300)).unwrap(), Duration::from_secs(300));
        assert!(matches!(
            scan_interval(Some(9)),
            Err(RefreshError::InvalidInterval(9))
        ));
        assert!(scan_interval(Some(301)).is_err());
    }
}
