use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::ReviewBackend;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Liveness of the analysis service as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Checking,
    Up,
    Down,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Checking => "Checking...",
            HealthStatus::Up => "Backend is running",
            HealthStatus::Down => "Backend is down",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Owns a background task that probes the backend immediately and then on a
/// fixed interval. The interval is the only retry mechanism. A probe that has
/// not answered within one interval counts as a failure. Dropping the monitor
/// (or calling [`HealthMonitor::stop`]) cancels the task.
pub struct HealthMonitor {
    status: watch::Receiver<HealthStatus>,
    task: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    pub fn start(backend: Arc<dyn ReviewBackend>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(HealthStatus::Checking);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let status = match timeout(every, backend.ping()).await {
                    Ok(Ok(())) => HealthStatus::Up,
                    Ok(Err(e)) => {
                        warn!(error = %e, "health probe failed");
                        HealthStatus::Down
                    }
                    Err(_) => {
                        warn!(after_ms = every.as_millis() as u64, "health probe timed out");
                        HealthStatus::Down
                    }
                };
                let previous = *tx.borrow();
                if previous != status {
                    info!(from = ?previous, to = ?status, "backend status changed");
                } else {
                    debug!(status = ?status, "health probe");
                }
                if tx.send(status).is_err() {
                    break;
                }
            }
        });
        Self {
            status: rx,
            task: Some(task),
        }
    }

    pub fn status(&self) -> HealthStatus {
        *self.status.borrow()
    }

    /// Receiver for the submission gate and status indicators.
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.status.clone()
    }

    /// Wait until the first probe has completed and return its outcome.
    pub async fn first_probe(&self) -> HealthStatus {
        let mut rx = self.status.clone();
        let status = match rx.wait_for(|s| *s != HealthStatus::Checking).await {
            Ok(status) => *status,
            Err(_) => HealthStatus::Down,
        };
        status
    }

    /// Cancel the probe task and wait for it to wind down.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
