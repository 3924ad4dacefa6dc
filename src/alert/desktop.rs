use crate::error::{AlertError, HostsentryError, Result};
use async_trait::async_trait;

use super::{AlertChannel, AlertMessage, AlertSink};

/// Desktop notification sink. Per-file-event notifications would drown the
/// session, so only anomaly alerts are surfaced here.
pub struct DesktopAlert;

impl DesktopAlert {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for DesktopAlert {
    async fn deliver(&self, message: &AlertMessage) -> Result<()> {
        let signal = match message {
            AlertMessage::Anomaly { signal, .. } => signal,
            AlertMessage::FileEvent { .. } => return Ok(()),
        };

        let body = format!(
            "Unusual file activity detected: {} events inside the window (threshold {})",
            signal.count, signal.threshold
        );

        notify_rust::Notification::new()
            .summary("Hostsentry: anomaly alert")
            .body(&body)
            .urgency(notify_rust::Urgency::Critical)
            .timeout(notify_rust::Timeout::Milliseconds(10_000))
            .show()
            .map_err(|e| {
                HostsentryError::Alert(AlertError::DesktopNotification(e.to_string()))
            })?;

        Ok(())
    }

    fn channel(&self) -> AlertChannel {
        AlertChannel::Desktop
    }
}
