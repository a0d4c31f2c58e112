//! Shared domain types.

pub mod item;
pub mod timestamp;

pub use item::{Channel, Item, RoutingTag, Status};
pub use timestamp::{format_timestamp, parse_timestamp};
