//! Recording sink for tests.
//!
//! Records every delivered payload without making network calls. Failure can
//! be switched on globally or per channel.

use async_trait::async_trait;
use boardwatch_core::error::{BoardWatchError, Result};
use boardwatch_core::traits::ChannelSink;
use boardwatch_core::types::Channel;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A payload delivered through the recording sink.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    pub channel: Channel,
    pub text: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    messages: Arc<RwLock<Vec<RecordedMessage>>>,
    failing: Arc<RwLock<HashSet<Channel>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `channel` fail (or succeed again).
    pub async fn set_should_fail(&self, channel: Channel, should_fail: bool) {
        let mut failing = self.failing.write().await;
        if should_fail {
            failing.insert(channel);
        } else {
            failing.remove(&channel);
        }
    }

    pub async fn messages(&self) -> Vec<RecordedMessage> {
        self.messages.read().await.clone()
    }

    pub async fn messages_for(&self, channel: Channel) -> Vec<RecordedMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}

#[async_trait]
impl ChannelSink for RecordingSink {
    fn name(&self) -> &str { "recording" }

    async fn send(&self, channel: Channel, payload: &str) -> Result<()> {
        if self.failing.read().await.contains(&channel) {
            return Err(BoardWatchError::channel(format!("mock failure on {channel}")));
        }
        self.messages.write().await.push(RecordedMessage {
            channel,
            text: payload.to_string(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }
}
