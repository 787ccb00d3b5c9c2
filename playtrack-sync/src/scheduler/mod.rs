//! Scheduler layer for the synchronizer
//!
//! This layer owns the per-job polling loops, decides which responses may
//! reach the store and announces what changed.

pub mod gate;
pub mod poller;

pub use gate::SequenceGate;
pub use poller::{PollingSynchronizer, SharedStore};

use playtrack_core::{JobId, JobStatus};

/// Notification published after the synchronizer touched a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A response changed the stored state
    Updated {
        job_id: JobId,
        revision: u64,
        status: JobStatus,
        progress: u8,
    },
    /// Tracking ended, either on a terminal status or on request
    Stopped { job_id: JobId, status: JobStatus },
    /// A status request failed; polling continues
    FetchFailed { job_id: JobId, message: String },
}

impl SyncEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            SyncEvent::Updated { job_id, .. }
            | SyncEvent::Stopped { job_id, .. }
            | SyncEvent::FetchFailed { job_id, .. } => job_id,
        }
    }
}
