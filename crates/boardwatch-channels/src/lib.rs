//! # BoardWatch Channels
//!
//! | Sink | Use |
//! |------|-----|
//! | slack | Incoming webhooks, one per routing channel |
//! | log | Dry runs, nothing leaves the process |
//! | mock | Records payloads for tests |

pub mod log;
pub mod mock;
pub mod slack;

pub use log::LogSink;
pub use mock::{RecordedMessage, RecordingSink};
pub use slack::SlackSink;
