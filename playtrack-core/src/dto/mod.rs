//! Data Transfer Objects for the execution console API
//!
//! This module contains DTOs exchanged with the console's HTTP endpoints.
//! DTOs mirror the wire format exactly and are lenient on input: the console
//! is not under our control, so missing fields deserialize to `None`.

pub mod cancel;
pub mod status;
