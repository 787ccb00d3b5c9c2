//! Playtrack Core
//!
//! Core types and the log-projection engine for tracking Ansible playbook runs.
//!
//! This crate contains:
//! - Domain types: Jobs, facts, tasks and recap counters
//! - DTOs: Wire shapes exchanged with the execution console
//! - Parsing: Line classification, fact extraction and per-host partitioning
//! - Store: Per-job state rebuilt from cumulative output
//! - Render: Pure display models derived from job state

pub mod domain;
pub mod dto;
pub mod parse;
pub mod render;
pub mod run;
pub mod store;

pub use domain::facts::Facts;
pub use domain::job::{JobId, JobState, JobStatus};
pub use domain::task::{TaskRecord, TaskStatus};
pub use store::{IngestOutcome, JobStateStore, OutputMode};
