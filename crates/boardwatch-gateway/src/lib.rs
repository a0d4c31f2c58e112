//! # BoardWatch Gateway
//!
//! Liveness and scheduler status over HTTP. Read-only; nothing here can
//! trigger or alter a poll cycle.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start_server};
