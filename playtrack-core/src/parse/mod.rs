//! Output parsing
//!
//! Turns raw `ansible-playbook` output into structured pieces:
//! - `classify`: one line to one tagged event
//! - `facts`: free text to host facts
//! - `partition`: combined output to per-host buckets
//! - `tasks`: a host bucket to its ordered task outcomes
//!
//! Nothing in here fails. Unparseable input degrades to plain lines and
//! empty facts.

pub mod classify;
pub mod facts;
pub mod partition;
pub mod tasks;

pub use classify::{LineClassifier, LineEvent, ResultOutcome, classify_line};
pub use facts::FactExtractor;
pub use partition::{Partition, PartitionLine, host_view, partition};
pub use tasks::build_tasks;
