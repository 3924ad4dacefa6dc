//! Best-effort pollers for activity the filesystem watcher cannot see:
//! new network connections and new processes. Each runs as its own worker
//! on a fixed interval, feeds feature vectors into the session's shared
//! detector, and never blocks the filesystem event path.

pub mod network;
pub mod process;

use crate::alert::{AlertMessage, AlertRouter};
use crate::detector::AnomalyDetector;
use crate::event::{AnomalySignal, FeatureVector};
use std::sync::Arc;

/// Feed one poller observation into the detector and forward any resulting
/// anomaly to the alert sinks.
pub(crate) async fn ingest(
    detector: &AnomalyDetector,
    alert_router: &Arc<AlertRouter>,
    features: FeatureVector,
) {
    if let Some(signal) = detector.add_event(&features) {
        log::warn!(
            "Anomaly raised ({}): {} events in window, threshold {}",
            AnomalySignal::REASON,
            signal.count,
            signal.threshold,
        );
        alert_router.dispatch(&AlertMessage::anomaly(signal)).await;
    }
}
