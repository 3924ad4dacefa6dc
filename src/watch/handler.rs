use crate::alert::{AlertMessage, AlertRouter};
use crate::detector::AnomalyDetector;
use crate::event::RawFsEvent;
use crate::filter::PathFilter;
use crate::normalize;
use crate::output::LogSink;
use std::sync::Arc;

/// Routes one raw notification through the pipeline: ignore filter,
/// normalization, alert delivery, durable log, anomaly detection.
pub struct EventRouter {
    filter: PathFilter,
    alert_router: Arc<AlertRouter>,
    log_sink: Arc<dyn LogSink>,
    detector: Arc<AnomalyDetector>,
}

impl EventRouter {
    pub fn new(
        filter: PathFilter,
        alert_router: Arc<AlertRouter>,
        log_sink: Arc<dyn LogSink>,
        detector: Arc<AnomalyDetector>,
    ) -> Self {
        Self {
            filter,
            alert_router,
            log_sink,
            detector,
        }
    }

    pub async fn handle(&self, raw: RawFsEvent) {
        // Ignored paths are a normal silent branch, not an error.
        if self.filter.should_ignore(&raw.path.to_string_lossy()) {
            log::debug!("Ignored path: {}", raw.path.display());
            return;
        }

        let (event, features) = normalize::normalize(&raw);
        let message = AlertMessage::file_event(event);

        // Interactive sinks see the line before the durable log does, and a
        // log failure must never block alert delivery.
        self.alert_router.dispatch(&message).await;
        if let Err(e) = self.log_sink.append(message.line()) {
            log::error!("Log sink append failed: {}", e);
        }

        if let Some(signal) = self.detector.add_event(&features) {
            log::warn!(
                "Anomaly raised ({}): {} events in window, threshold {}",
                crate::event::AnomalySignal::REASON,
                signal.count,
                signal.threshold,
            );
            // The original never wrote anomaly lines to the file log; they
            // go to alert sinks only.
            let alert = AlertMessage::anomaly(signal);
            self.alert_router.dispatch(&alert).await;
        }
    }
}
