//! Core domain types
//!
//! This module contains the domain structures shared by the engine, the
//! synchronizer and any display layer. These types describe a playbook run
//! as it is understood from its output: job lifecycle, per-host facts,
//! per-host task outcomes and the final recap counters.

pub mod facts;
pub mod job;
pub mod recap;
pub mod task;
