//! Offline Request Queue: interception, durable enqueue, sequential replay.

use std::time::Duration;

use tokio::sync::{watch, Mutex, Notify};
use tokio::time::MissedTickBehavior;

use crate::{
    config::SyncConfig,
    db::QueueStore,
    error::SyncError,
    models::{NewRequest, ReplayReport, Submission},
    transport::{HttpTransport, Transport},
};

/// Statuses worth retrying later: timeouts, rate limits, server faults.
fn is_retryable(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// A client error the server will keep refusing.
fn is_rejected(status: u16) -> bool {
    (400..500).contains(&status) && !is_retryable(status)
}

pub struct OfflineQueue<T: Transport = HttpTransport> {
    store: QueueStore,
    transport: T,
    max_attempts: u32,
    resync_interval: Duration,
    sync_signal: Notify,
    replay_lock: Mutex<()>,
}

impl OfflineQueue<HttpTransport> {
    /// Open the queue database under `config.data_dir` with the HTTP
    /// transport.
    pub async fn open(config: &SyncConfig) -> Result<Self, SyncError> {
        let transport = HttpTransport::new(config)?;
        let store = QueueStore::open(&config.db_path()).await?;
        Ok(Self::with_transport(store, transport, config))
    }
}

impl<T: Transport> OfflineQueue<T> {
    pub fn with_transport(store: QueueStore, transport: T, config: &SyncConfig) -> Self {
        Self {
            store,
            transport,
            max_attempts: config.max_attempts.max(1),
            resync_interval: config.resync_interval.max(Duration::from_millis(10)),
            sync_signal: Notify::new(),
            replay_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` now; if there is no connectivity and it is mutating,
    /// persist it for replay instead of failing.
    ///
    /// Read-only requests are never queued; their network errors are
    /// returned as-is.
    pub async fn submit(&self, request: NewRequest) -> Result<Submission, SyncError> {
        match self.transport.send(&request).await {
            Ok(status) => Ok(Submission::Sent { status }),
            Err(SyncError::Network(_)) if request.is_mutating() => {
                let key = self.store.enqueue(&request).await?;
                tracing::warn!(
                    target: "pd_sync",
                    event = "request_queued",
                    key,
                    method = %request.method
                );
                self.request_sync();
                Ok(Submission::Queued { key })
            }
            Err(e) => Err(e),
        }
    }

    /// Signal that connectivity may be back.  Wakes the background loop.
    pub fn request_sync(&self) {
        self.sync_signal.notify_one();
    }

    /// Replay every queued request once, oldest first.
    ///
    /// Passes never overlap: a second caller waits for the running pass to
    /// finish and then sees the remaining rows.
    pub async fn replay(&self) -> Result<ReplayReport, SyncError> {
        let _guard = self.replay_lock.lock().await;
        let pending = self.store.pending().await?;
        let total = pending.len();
        let mut report = ReplayReport::default();

        for (idx, item) in pending.into_iter().enumerate() {
            match self.transport.send(&item.to_request()).await {
                Ok(status) if is_success(status) => {
                    self.store.remove(item.key).await?;
                    report.delivered.push(item.key);
                }
                Ok(status) if is_rejected(status) => {
                    self.store.remove(item.key).await?;
                    tracing::warn!(
                        target: "pd_sync",
                        event = "request_rejected",
                        key = item.key,
                        status
                    );
                    report.rejected.push((item.key, status));
                }
                // 408/429/5xx, plus 1xx/3xx which a JSON API should never return.
                Ok(status) => {
                    let attempts = self.store.record_attempt(item.key).await?;
                    if attempts >= self.max_attempts {
                        self.store.remove(item.key).await?;
                        tracing::warn!(
                            target: "pd_sync",
                            event = "request_abandoned",
                            key = item.key,
                            status,
                            attempts
                        );
                        report.abandoned.push(item.key);
                        continue;
                    }
                    tracing::info!(
                        target: "pd_sync",
                        event = "replay_deferred",
                        key = item.key,
                        status,
                        attempts
                    );
                    report.retained = total - idx;
                    break;
                }
                Err(SyncError::Network(_)) => {
                    tracing::debug!(target: "pd_sync", event = "replay_offline", key = item.key);
                    report.retained = total - idx;
                    break;
                }
                Err(SyncError::InvalidRequest(reason)) => {
                    self.store.remove(item.key).await?;
                    tracing::warn!(
                        target: "pd_sync",
                        event = "request_unsendable",
                        key = item.key,
                        %reason
                    );
                    report.abandoned.push(item.key);
                }
                Err(e) => return Err(e),
            }
        }

        if !report.is_empty() {
            tracing::info!(
                target: "pd_sync",
                event = "replay_finished",
                delivered = report.delivered.len(),
                rejected = report.rejected.len(),
                abandoned = report.abandoned.len(),
                retained = report.retained
            );
        }
        Ok(report)
    }

    /// Background-sync loop: replays on startup, on every sync signal and on
    /// every resync tick, until `shutdown` turns true or its sender is
    /// dropped.  A pass in flight is never interrupted.
    pub async fn run_background_sync(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.resync_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = self.sync_signal.notified() => {}
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.replay().await {
                tracing::warn!(target: "pd_sync", event = "replay_failed", error = %e);
            }
        }
        tracing::debug!(target: "pd_sync", event = "background_sync_stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(302));
        assert!(is_retryable(408));
        assert!(is_retryable(429));
        assert!(is_retryable(503));
        assert!(!is_retryable(400));
        assert!(!is_retryable(422));
        assert!(is_rejected(400));
        assert!(is_rejected(404));
        assert!(is_rejected(422));
        assert!(!is_rejected(408));
        assert!(!is_rejected(429));
        assert!(!is_rejected(101));
        assert!(!is_rejected(302));
        assert!(!is_rejected(503));
    }
}
