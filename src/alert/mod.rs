pub mod desktop;
pub mod null;
pub mod stdout;

use crate::error::Result;
use crate::event::{AnomalySignal, FileEvent};
use async_trait::async_trait;

/// What kind of line is being delivered. Sinks use this to decide severity
/// styling and whether to surface the line at all (the desktop sink only
/// shows anomalies).
#[derive(Debug, Clone)]
pub enum AlertMessage {
    FileEvent { event: FileEvent, line: String },
    Anomaly { signal: AnomalySignal, line: String },
}

impl AlertMessage {
    pub fn file_event(event: FileEvent) -> Self {
        let line = event.log_line();
        AlertMessage::FileEvent { event, line }
    }

    pub fn anomaly(signal: AnomalySignal) -> Self {
        let line = signal.alert_line();
        AlertMessage::Anomaly { signal, line }
    }

    pub fn line(&self) -> &str {
        match self {
            AlertMessage::FileEvent { line, .. } => line,
            AlertMessage::Anomaly { line, .. } => line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertChannel {
    Stdout,
    Desktop,
    Null,
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, message: &AlertMessage) -> Result<()>;
    fn channel(&self) -> AlertChannel;
}

/// Fans one message out to every configured sink. A failing sink is logged
/// and skipped; the message still reaches whichever sinks succeed.
pub struct AlertRouter {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl AlertRouter {
    pub fn new(channels: &[AlertChannel]) -> Self {
        let mut sinks: Vec<Box<dyn AlertSink>> = Vec::new();

        for channel in channels {
            match channel {
                AlertChannel::Stdout => sinks.push(Box::new(stdout::StdoutAlert::new())),
                AlertChannel::Desktop => sinks.push(Box::new(desktop::DesktopAlert::new())),
                AlertChannel::Null => sinks.push(Box::new(null::NullAlert)),
            }
        }

        // Default to stdout if no channels configured
        if sinks.is_empty() {
            sinks.push(Box::new(stdout::StdoutAlert::new()));
        }

        Self { sinks }
    }

    /// Build a router from already-constructed sinks. Tests use this to
    /// inject recording sinks.
    pub fn from_sinks(sinks: Vec<Box<dyn AlertSink>>) -> Self {
        Self { sinks }
    }

    pub async fn dispatch(&self, message: &AlertMessage) {
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(message).await {
                log::error!("Alert delivery failed for {:?}: {}", sink.channel(), e);
            }
        }
    }
}

/// Parse a channel name from config or the `--alert` CLI flag.
pub fn parse_alert_channel(s: &str) -> Option<AlertChannel> {
    match s {
        "stdout" => Some(AlertChannel::Stdout),
        "desktop" => Some(AlertChannel::Desktop),
        "null" | "none" => Some(AlertChannel::Null),
        _ => None,
    }
}
