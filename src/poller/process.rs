use crate::alert::AlertRouter;
use crate::detector::AnomalyDetector;
use crate::event::{FeatureVector, EVENT_ID_PROCESS_START};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawn the process-creation poller. Each tick scans /proc for PID
/// directories and feeds one event per previously unseen PID into the
/// shared detector.
pub fn spawn(
    interval: Duration,
    detector: Arc<AnomalyDetector>,
    alert_router: Arc<AlertRouter>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut known = running_pids();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = running_pids();
                    for pid in current.difference(&known) {
                        log::debug!(
                            "New process: pid={} ({})",
                            pid,
                            process_name(*pid).unwrap_or_else(|| "?".to_string()),
                        );
                        super::ingest(
                            &detector,
                            &alert_router,
                            FeatureVector {
                                event_id: EVENT_ID_PROCESS_START,
                                file_size: 0,
                            },
                        )
                        .await;
                    }
                    known = current;
                }
                _ = shutdown.changed() => {
                    log::debug!("Process poller shutting down");
                    break;
                }
            }
        }
    })
}

/// PIDs currently visible under /proc. An unreadable /proc yields an empty
/// set rather than an error.
fn running_pids() -> HashSet<i32> {
    let mut pids = HashSet::new();
    let entries = match std::fs::read_dir("/proc") {
        Ok(e) => e,
        Err(e) => {
            log::debug!("Could not read /proc: {}", e);
            return pids;
        }
    };
    for entry in entries.flatten() {
        if let Ok(pid) = entry.file_name().to_string_lossy().parse::<i32>() {
            pids.insert(pid);
        }
    }
    pids
}

/// Read the short command name from /proc/<pid>/comm. Best effort: the
/// process may be gone by the time we look.
fn process_name(pid: i32) -> Option<String> {
    std::fs::read_to_string(format!("/proc/{}/comm", pid))
        .ok()
        .map(|s| s.trim().to_string())
}
