//! # BoardWatch Scheduler
//!
//! Decides, per item, whether a reminder is due and drives those decisions
//! on a fixed poll period.
//!
//! ## Architecture
//! ```text
//! Scheduler (tokio timer, anchored to cycle start)
//!   └── NotificationEngine::poll
//!         ├── DataSource::fetch_items      (one snapshot per cycle)
//!         ├── decide(item, now, interval)  → Notify / Clear / Skip
//!         └── bounded fan-out
//!               ├── ChannelSink::send  → StateStore::write(now)
//!               └── StateStore::clear
//! ```

pub mod decision;
pub mod engine;
pub mod notify;
pub mod scheduler;

pub use decision::{Decision, SkipReason, decide};
pub use engine::{CycleReport, CycleSummary, EngineSettings, ItemAction, ItemOutcome, NotificationEngine};
pub use notify::{Notification, item_link};
pub use scheduler::{Scheduler, SchedulerSnapshot, SchedulerState};
