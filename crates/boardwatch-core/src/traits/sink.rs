//! Channel sink trait — delivery of notification text.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Channel;

#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Sink name (e.g., "slack").
    fn name(&self) -> &str;

    /// Deliver `payload` to `channel`.
    async fn send(&self, channel: Channel, payload: &str) -> Result<()>;
}
