//! Slack channel — posts reminders to incoming webhooks.
//!
//! One webhook URL per routing channel. A channel without a webhook fails the
//! send so the item stays eligible.

use async_trait::async_trait;
use boardwatch_core::config::SlackConfig;
use boardwatch_core::error::{BoardWatchError, Result};
use boardwatch_core::traits::ChannelSink;
use boardwatch_core::types::Channel;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct WebhookBody<'a> {
    text: &'a str,
}

/// Slack incoming-webhook sink.
pub struct SlackSink {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackSink {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BoardWatchError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn webhook(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Ucr => self.config.webhook_ucr.as_deref(),
            Channel::Dl => self.config.webhook_dl.as_deref(),
        }
    }
}

#[async_trait]
impl ChannelSink for SlackSink {
    fn name(&self) -> &str { "slack" }

    async fn send(&self, channel: Channel, payload: &str) -> Result<()> {
        let url = self
            .webhook(channel)
            .ok_or_else(|| BoardWatchError::ChannelNotConfigured(format!("no Slack webhook for {channel}")))?;

        let response = self
            .client
            .post(url)
            .json(&WebhookBody { text: payload })
            .send()
            .await
            .map_err(|e| BoardWatchError::channel(format!("Slack {channel} send failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BoardWatchError::channel(format!("Slack {channel} {status}: {text}")));
        }
        Ok(())
    }
}
