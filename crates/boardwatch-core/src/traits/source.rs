//! Data source trait — where item snapshots come from.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Item;

/// Read-only access to the monitored board.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source name (e.g., "monday").
    fn name(&self) -> &str;

    /// Fetch a full snapshot of the board. Fails with `SourceUnavailable` on
    /// transport or auth problems.
    async fn fetch_items(&self) -> Result<Vec<Item>>;
}
