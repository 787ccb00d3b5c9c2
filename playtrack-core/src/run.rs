//! Multi-host runs
//!
//! A run against several hosts is launched as one sub-job per host
//! (`{master}-{host}`). `RunAggregate` rolls their progress and status up
//! into a single master view.

use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::job::{JobId, JobStatus};
use crate::store::JobStateStore;

/// Rolled-up view of a multi-host run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunProgress {
    pub progress: u8,
    pub status: JobStatus,
    /// Sub-jobs in a terminal state
    pub finished: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct RunAggregate {
    master: JobId,
    members: IndexMap<String, JobId>,
    last_progress: u8,
}

impl RunAggregate {
    /// Groups one sub-job per host under `master`
    pub fn new(master: JobId, hosts: &[String]) -> Self {
        let members = hosts
            .iter()
            .map(|host| (host.clone(), master.for_host(host)))
            .collect();
        Self {
            master,
            members,
            last_progress: 0,
        }
    }

    pub fn master(&self) -> &JobId {
        &self.master
    }

    /// Host to sub-job id, in declaration order
    pub fn members(&self) -> &IndexMap<String, JobId> {
        &self.members
    }

    /// Recomputes the master view from the sub-jobs in `store`
    ///
    /// Progress is the mean of the members and never goes down. A member the
    /// store does not know yet counts as pending at 0%. The run stays
    /// running until every member is terminal; it then fails if any member
    /// failed, else is cancelled if any member was cancelled.
    pub fn update(&mut self, store: &JobStateStore) -> RunProgress {
        let total = self.members.len();
        let mut sum = 0u32;
        let mut finished = 0;
        let mut any_failed = false;
        let mut any_cancelled = false;
        let mut any_started = false;

        for job_id in self.members.values() {
            let Some(state) = store.get(job_id) else {
                continue;
            };
            sum += u32::from(state.progress);
            if state.status != JobStatus::Pending {
                any_started = true;
            }
            if state.is_terminal() {
                finished += 1;
            }
            match state.status {
                JobStatus::Failed => any_failed = true,
                JobStatus::Cancelled => any_cancelled = true,
                _ => {}
            }
        }

        let status = if total > 0 && finished == total {
            if any_failed {
                JobStatus::Failed
            } else if any_cancelled {
                JobStatus::Cancelled
            } else {
                JobStatus::Completed
            }
        } else if any_started {
            JobStatus::Running
        } else {
            JobStatus::Pending
        };

        let mean = if total == 0 {
            0
        } else {
            (sum as f64 / total as f64).round() as u8
        };
        self.last_progress = self.last_progress.max(mean);
        if status.is_terminal() {
            self.last_progress = 100;
        }

        RunProgress {
            progress: self.last_progress,
            status,
            finished,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::status::StatusSnapshot;

    fn hosts() -> Vec<String> {
        vec!["web01".to_string(), "web02".to_string()]
    }

    fn report(store: &mut JobStateStore, id: &JobId, status: &str, progress: f64) {
        store.ingest(id, &[], &StatusSnapshot::new(status, progress, ""));
    }

    #[test]
    fn test_member_ids() {
        let run = RunAggregate::new(JobId::from("m"), &hosts());
        assert_eq!(run.members()["web02"].as_str(), "m-web02");
        assert_eq!(run.master().as_str(), "m");
    }

    #[test]
    fn test_progress_is_mean_and_monotonic() {
        let mut store = JobStateStore::new();
        let mut run = RunAggregate::new(JobId::from("m"), &hosts());
        let web01 = run.members()["web01"].clone();
        let web02 = run.members()["web02"].clone();

        assert_eq!(run.update(&store).status, JobStatus::Pending);

        report(&mut store, &web01, "running", 60.0);
        let progress = run.update(&store);
        assert_eq!(progress.progress, 30);
        assert_eq!(progress.status, JobStatus::Running);

        // A member restarted from scratch does not pull the run back
        store.forget(&web01);
        report(&mut store, &web01, "running", 10.0);
        report(&mut store, &web02, "running", 20.0);
        assert_eq!(run.update(&store).progress, 30);
    }

    #[test]
    fn test_running_until_all_terminal() {
        let mut store = JobStateStore::new();
        let mut run = RunAggregate::new(JobId::from("m"), &hosts());
        let web01 = run.members()["web01"].clone();
        let web02 = run.members()["web02"].clone();

        report(&mut store, &web01, "failed", 40.0);
        report(&mut store, &web02, "running", 50.0);
        let progress = run.update(&store);
        assert_eq!(progress.status, JobStatus::Running);
        assert_eq!(progress.finished, 1);

        report(&mut store, &web02, "completed", 100.0);
        let progress = run.update(&store);
        assert_eq!(progress.status, JobStatus::Failed);
        assert_eq!(progress.progress, 100);
        assert_eq!(progress.finished, 2);
    }

    #[test]
    fn test_cancelled_when_no_failure() {
        let mut store = JobStateStore::new();
        let mut run = RunAggregate::new(JobId::from("m"), &hosts());
        let web01 = run.members()["web01"].clone();
        let web02 = run.members()["web02"].clone();

        report(&mut store, &web01, "cancelled", 0.0);
        report(&mut store, &web02, "completed", 100.0);
        assert_eq!(run.update(&store).status, JobStatus::Cancelled);
    }
}
