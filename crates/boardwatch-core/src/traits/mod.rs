//! Seams between the engine and its remote collaborators.

pub mod sink;
pub mod source;
pub mod state;

pub use sink::ChannelSink;
pub use source::DataSource;
pub use state::StateStore;
