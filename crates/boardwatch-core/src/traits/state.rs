//! State store trait — the per-item last-notified marker.

use async_trait::async_trait;

use crate::error::Result;

/// Key → timestamp-string store. Implementations must not cache: every call
/// reaches the backing store.
#[async_trait]
pub trait StateStore: Send + Sync {
    fn name(&self) -> &str;

    /// Read the stored marker. `None` when absent or empty.
    async fn read(&self, item_id: &str) -> Result<Option<String>>;

    /// Overwrite the marker.
    async fn write(&self, item_id: &str, value: &str) -> Result<()>;

    /// Clear the marker.
    async fn clear(&self, item_id: &str) -> Result<()> {
        self.write(item_id, "").await
    }
}
