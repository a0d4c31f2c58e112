//! # BoardWatch monday.com integration
//!
//! One GraphQL client per board, shared by the item source and the
//! last-notified state store. Columns are addressed by title; ids are resolved
//! through a short-lived cache.

pub mod client;
pub mod source;
pub mod state;

pub use client::{BoardColumns, MondayClient};
pub use source::MondaySource;
pub use state::MondayStateStore;
