use crate::error::Result;
use async_trait::async_trait;

use super::{AlertChannel, AlertMessage, AlertSink};

/// Discards every message. Headless deployments and tests.
pub struct NullAlert;

#[async_trait]
impl AlertSink for NullAlert {
    async fn deliver(&self, _message: &AlertMessage) -> Result<()> {
        Ok(())
    }

    fn channel(&self) -> AlertChannel {
        AlertChannel::Null
    }
}
