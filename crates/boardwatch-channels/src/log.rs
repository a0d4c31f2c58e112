//! Log-only sink for dry runs.

use async_trait::async_trait;
use boardwatch_core::error::Result;
use boardwatch_core::traits::ChannelSink;
use boardwatch_core::types::Channel;

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl ChannelSink for LogSink {
    fn name(&self) -> &str { "log" }

    async fn send(&self, channel: Channel, payload: &str) -> Result<()> {
        tracing::info!("[dry-run] {channel} <- {}", payload.replace('\n', " | "));
        Ok(())
    }
}
