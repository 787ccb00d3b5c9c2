//! Playtrack Sync
//!
//! Keeps [`playtrack_core::JobStateStore`] current by polling the execution
//! console. One polling loop runs per tracked job; responses are admitted
//! in send order and changes are published on a broadcast channel.

pub mod config;
pub mod scheduler;

pub use config::SyncConfig;
pub use scheduler::{PollingSynchronizer, SequenceGate, SharedStore, SyncEvent};
