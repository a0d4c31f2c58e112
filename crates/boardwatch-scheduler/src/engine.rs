//! Notification engine — one poll cycle over a board snapshot.
//!
//! Every item is decided independently (see [`crate::decision`]) and executed
//! with its own error containment: a failed send or write is recorded on that
//! item's outcome and never aborts the rest of the cycle. The marker is only
//! written after a successful send, so an undelivered reminder stays due.

use boardwatch_core::config::AppConfig;
use boardwatch_core::error::{BoardWatchError, Result};
use boardwatch_core::traits::{ChannelSink, DataSource, StateStore};
use boardwatch_core::types::{Channel, Item, format_timestamp};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;

use crate::decision::{Decision, SkipReason, decide};
use crate::notify::Notification;

/// What happened to one item in one cycle.
#[derive(Debug)]
pub enum ItemAction {
    Notified(Channel),
    Cleared,
    Skipped(SkipReason),
    /// Send or state write failed; contained to this item.
    Failed(BoardWatchError),
}

impl std::fmt::Display for ItemAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemAction::Notified(channel) => write!(f, "notified {channel}"),
            ItemAction::Cleared => write!(f, "cleared"),
            ItemAction::Skipped(reason) => write!(f, "skipped ({reason})"),
            ItemAction::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

#[derive(Debug)]
pub struct ItemOutcome {
    pub item_id: String,
    pub action: ItemAction,
}

/// Counts per action kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub items: usize,
    pub notified: usize,
    pub cleared: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} items: {} notified, {} cleared, {} skipped, {} failed",
            self.items, self.notified, self.cleared, self.skipped, self.failed
        )
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub now: DateTime<Utc>,
    /// In snapshot order.
    pub outcomes: Vec<ItemOutcome>,
}

impl CycleReport {
    pub fn action_for(&self, item_id: &str) -> Option<&ItemAction> {
        self.outcomes
            .iter()
            .find(|o| o.item_id == item_id)
            .map(|o| &o.action)
    }

    pub fn summary(&self) -> CycleSummary {
        let mut summary = CycleSummary {
            items: self.outcomes.len(),
            ..CycleSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.action {
                ItemAction::Notified(_) => summary.notified += 1,
                ItemAction::Cleared => summary.cleared += 1,
                ItemAction::Skipped(_) => summary.skipped += 1,
                ItemAction::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Engine settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub board_id: u64,
    pub interval: chrono::Duration,
    pub interval_hours: f64,
    pub max_concurrency: usize,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            board_id: config.monday.board_id,
            interval: config.notify_interval(),
            interval_hours: config.notify.interval_hours,
            max_concurrency: config.notify.max_concurrency.max(1),
        }
    }
}

pub struct NotificationEngine {
    source: Arc<dyn DataSource>,
    sink: Arc<dyn ChannelSink>,
    state: Arc<dyn StateStore>,
    settings: EngineSettings,
}

impl NotificationEngine {
    pub fn new(
        settings: EngineSettings,
        source: Arc<dyn DataSource>,
        sink: Arc<dyn ChannelSink>,
        state: Arc<dyn StateStore>,
    ) -> Self {
        Self { source, sink, state, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Fetch a snapshot and run one cycle over it. Only a failed fetch is an error.
    pub async fn poll(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        tracing::info!("Fetching items from {} board {}...", self.source.name(), self.settings.board_id);
        let items = self.source.fetch_items().await.map_err(|e| match e {
            BoardWatchError::SourceUnavailable(_) => e,
            other => BoardWatchError::source_unavailable(other.to_string()),
        })?;
        tracing::info!("Fetched {} items", items.len());

        let report = self.run_cycle(items, now).await;
        tracing::info!("Cycle finished: {}", report.summary());
        Ok(report)
    }

    /// Decide and execute every item of the snapshot.
    pub async fn run_cycle(&self, items: Vec<Item>, now: DateTime<Utc>) -> CycleReport {
        let outcomes: Vec<ItemOutcome> = futures::stream::iter(items)
            .map(|item| self.process_item(item, now))
            .buffered(self.settings.max_concurrency)
            .collect()
            .await;
        CycleReport { now, outcomes }
    }

    async fn process_item(&self, item: Item, now: DateTime<Utc>) -> ItemOutcome {
        let action = match decide(&item, now, self.settings.interval) {
            Decision::Clear => self.clear(&item).await,
            Decision::Notify(channel) => self.notify(&item, channel, now).await,
            Decision::Skip(reason) => {
                if let SkipReason::Unroutable { tag } = &reason {
                    let warning = BoardWatchError::UnroutableItem {
                        item_id: item.id.clone(),
                        tag: tag.to_string(),
                    };
                    tracing::warn!("{warning} ({}), skipping", item.name);
                }
                ItemAction::Skipped(reason)
            }
        };
        ItemOutcome { item_id: item.id, action }
    }

    async fn clear(&self, item: &Item) -> ItemAction {
        match self.state.clear(&item.id).await {
            Ok(()) => {
                tracing::info!("Item {} ({}) is {}, reminder marker cleared", item.id, item.name, item.status);
                ItemAction::Cleared
            }
            Err(e) => {
                let err = as_write_failure(&item.id, e);
                tracing::warn!("{err}, will retry next cycle");
                ItemAction::Failed(err)
            }
        }
    }

    async fn notify(&self, item: &Item, channel: Channel, now: DateTime<Utc>) -> ItemAction {
        let payload = Notification::new(item, self.settings.board_id, self.settings.interval_hours).render();

        if let Err(e) = self.sink.send(channel, &payload).await {
            let err = BoardWatchError::send_failed(&item.id, channel, e);
            tracing::warn!("{err}, item stays due");
            return ItemAction::Failed(err);
        }

        match self.state.write(&item.id, &format_timestamp(now)).await {
            Ok(()) => {
                tracing::info!("Notified item {} ({}) to {channel} channel", item.id, item.name);
                ItemAction::Notified(channel)
            }
            Err(e) => {
                let err = as_write_failure(&item.id, e);
                tracing::warn!("{err}, reminder was delivered but may repeat next cycle");
                ItemAction::Failed(err)
            }
        }
    }
}

fn as_write_failure(item_id: &str, err: BoardWatchError) -> BoardWatchError {
    match err {
        BoardWatchError::ItemWriteFailed { .. } => err,
        other => BoardWatchError::write_failed(item_id, other),
    }
}
