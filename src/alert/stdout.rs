use crate::error::Result;
use async_trait::async_trait;
use colored::Colorize;

use super::{AlertChannel, AlertMessage, AlertSink};

/// Console sink: file events in plain green, anomaly alerts in bold red so
/// a burst stands out in the scrollback.
pub struct StdoutAlert;

impl StdoutAlert {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for StdoutAlert {
    async fn deliver(&self, message: &AlertMessage) -> Result<()> {
        match message {
            AlertMessage::FileEvent { line, .. } => {
                println!("{}", line.green());
            }
            AlertMessage::Anomaly { line, .. } => {
                println!("{}", line.red().bold());
            }
        }
        Ok(())
    }

    fn channel(&self) -> AlertChannel {
        AlertChannel::Stdout
    }
}
