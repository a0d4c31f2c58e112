//! Unified error types for BoardWatch.

use thiserror::Error;

/// Result type alias using BoardWatchError.
pub type Result<T> = std::result::Result<T, BoardWatchError>;

#[derive(Error, Debug)]
pub enum BoardWatchError {
    // Cycle-level errors
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Column not found on board: {0}")]
    ColumnNotFound(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    // Per-item errors
    #[error("State write failed for item {item_id}: {reason}")]
    ItemWriteFailed { item_id: String, reason: String },

    #[error("Notification to {channel} failed for item {item_id}: {reason}")]
    ItemSendFailed {
        item_id: String,
        channel: String,
        reason: String,
    },

    #[error("Unroutable item {item_id}: tag {tag:?}")]
    UnroutableItem { item_id: String, tag: String },

    #[error("Malformed state value: {0:?}")]
    MalformedState(String),

    // Channel errors
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Channel not configured: {0}")]
    ChannelNotConfigured(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{0}")]
    Other(String),
}

impl BoardWatchError {
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn write_failed(item_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::ItemWriteFailed {
            item_id: item_id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn send_failed(
        item_id: impl Into<String>,
        channel: impl ToString,
        reason: impl ToString,
    ) -> Self {
        Self::ItemSendFailed {
            item_id: item_id.into(),
            channel: channel.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts a whole poll cycle rather than one item.
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::ColumnNotFound(_) | Self::GraphQl(_) | Self::Http(_)
        )
    }
}
