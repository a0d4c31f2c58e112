//! # BoardWatch Core
//! Traits, types, configuration and errors shared by every BoardWatch crate.

pub mod config;
pub mod error;
pub mod state;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{BoardWatchError, Result};
pub use state::MemoryStateStore;
pub use traits::{ChannelSink, DataSource, StateStore};
pub use types::{Channel, Item, RoutingTag, Status};
