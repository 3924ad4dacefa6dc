use crate::alert::AlertRouter;
use crate::detector::AnomalyDetector;
use crate::event::{FeatureVector, EVENT_ID_NETWORK_CONNECTION};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawn the network-connection poller. Each tick diffs the set of
/// established TCP connections from procfs; every new remote endpoint
/// counts as one event toward the shared detector.
pub fn spawn(
    interval: Duration,
    detector: Arc<AnomalyDetector>,
    alert_router: Arc<AlertRouter>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut known: HashSet<String> = established_connections().into_iter().collect();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current: HashSet<String> =
                        established_connections().into_iter().collect();
                    for endpoint in current.difference(&known) {
                        log::debug!("New network connection: {}", endpoint);
                        super::ingest(
                            &detector,
                            &alert_router,
                            FeatureVector {
                                event_id: EVENT_ID_NETWORK_CONNECTION,
                                file_size: 0,
                            },
                        )
                        .await;
                    }
                    known = current;
                }
                _ = shutdown.changed() => {
                    log::debug!("Network poller shutting down");
                    break;
                }
            }
        }
    })
}

/// Remote endpoints of established TCP connections, read from
/// /proc/net/tcp and /proc/net/tcp6. Unreadable tables (non-Linux, locked
/// down procfs) yield an empty set rather than an error.
fn established_connections() -> Vec<String> {
    let mut endpoints = Vec::new();
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        let content = match std::fs::read_to_string(table) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Could not read {}: {}", table, e);
                continue;
            }
        };
        endpoints.extend(parse_established(&content));
    }
    endpoints
}

/// Parse a procfs TCP table, keeping remote addresses of connections in
/// state 01 (ESTABLISHED). Addresses stay in their hex form; the poller
/// only diffs them, it never displays them.
fn parse_established(table: &str) -> Vec<String> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _slot = fields.next()?;
            let _local = fields.next()?;
            let remote = fields.next()?;
            let state = fields.next()?;
            if state == "01" {
                Some(remote.to_string())
            } else {
                None
            }
        })
        .collect()
}
