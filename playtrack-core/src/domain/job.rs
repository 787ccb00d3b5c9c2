//! Job domain types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::facts::Facts;
use crate::domain::recap::RecapStats;
use crate::domain::task::TaskRecord;
use crate::parse::partition::Partition;

/// Identifier of one automation run
///
/// Opaque to the engine. Per-host sub-jobs of a multi-host run are addressed
/// as `{base}-{host}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the sub-job running this job's playbook against a single host
    pub fn for_host(&self, host: &str) -> JobId {
        JobId(format!("{}-{}", self.0, host))
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId(s)
    }
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Parses a status string as reported by the console
    ///
    /// Returns `None` for anything unrecognized (including `not_found`);
    /// callers decide how to treat unknown reports.
    pub fn from_remote(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" | "scheduled" => Some(JobStatus::Pending),
            "running" | "started" | "in_progress" => Some(JobStatus::Running),
            "completed" | "success" | "succeeded" | "done" | "finished" => {
                Some(JobStatus::Completed)
            }
            "failed" | "error" | "failure" => Some(JobStatus::Failed),
            "cancelled" | "canceled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether no further polling happens after this status
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Applies a reported status on top of the current one
    ///
    /// Terminal states are sticky and `Pending` never follows `Running`.
    pub fn advance(self, reported: JobStatus) -> JobStatus {
        if self.is_terminal() {
            return self;
        }
        match (self, reported) {
            (JobStatus::Running, JobStatus::Pending) => JobStatus::Running,
            (_, next) => next,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Parsed state of one tracked job
///
/// Owned by [`crate::store::JobStateStore`]; everything except `status`,
/// `progress` and `raw_output` is derived from the output on each ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub raw_output: String,
    pub hosts: Vec<String>,
    pub partition: Partition,
    pub facts: IndexMap<String, Facts>,
    pub tasks: IndexMap<String, Vec<TaskRecord>>,
    pub recap: IndexMap<String, RecapStats>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of ingests that changed this state
    pub revision: u64,
}

impl JobState {
    /// Creates an empty pending job for the given hosts
    ///
    /// Hosts are de-duplicated case-insensitively, keeping declaration order.
    pub fn new(id: JobId, hosts: &[String]) -> Self {
        let mut declared: Vec<String> = Vec::with_capacity(hosts.len());
        for host in hosts {
            let host = host.trim();
            if host.is_empty() || declared.iter().any(|h| h.eq_ignore_ascii_case(host)) {
                continue;
            }
            declared.push(host.to_string());
        }

        let now = Utc::now();
        let partition = Partition::empty(&declared);
        let facts = declared
            .iter()
            .map(|h| (h.clone(), Facts::default()))
            .collect();
        let tasks = declared.iter().map(|h| (h.clone(), Vec::new())).collect();

        Self {
            id,
            status: JobStatus::Pending,
            progress: 0,
            raw_output: String::new(),
            hosts: declared,
            partition,
            facts,
            tasks,
            recap: IndexMap::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Returns the declared spelling of `host`, if it belongs to this job
    pub fn declared_host(&self, host: &str) -> Option<&str> {
        self.hosts
            .iter()
            .find(|h| h.eq_ignore_ascii_case(host))
            .map(String::as_str)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_remote() {
        assert_eq!(JobStatus::from_remote("running"), Some(JobStatus::Running));
        assert_eq!(JobStatus::from_remote("COMPLETED"), Some(JobStatus::Completed));
        assert_eq!(JobStatus::from_remote("canceled"), Some(JobStatus::Cancelled));
        assert_eq!(JobStatus::from_remote("not_found"), None);
        assert_eq!(JobStatus::from_remote(""), None);
    }

    #[test]
    fn test_status_advance_is_monotonic() {
        assert_eq!(
            JobStatus::Pending.advance(JobStatus::Running),
            JobStatus::Running
        );
        assert_eq!(
            JobStatus::Running.advance(JobStatus::Pending),
            JobStatus::Running
        );
        assert_eq!(
            JobStatus::Failed.advance(JobStatus::Running),
            JobStatus::Failed
        );
        assert_eq!(
            JobStatus::Completed.advance(JobStatus::Cancelled),
            JobStatus::Completed
        );
        assert_eq!(
            JobStatus::Pending.advance(JobStatus::Completed),
            JobStatus::Completed
        );
    }

    #[test]
    fn test_job_id_for_host() {
        let id = JobId::from("baseline.yml_20240101_120000");
        assert_eq!(
            id.for_host("web01").as_str(),
            "baseline.yml_20240101_120000-web01"
        );
    }

    #[test]
    fn test_job_state_dedups_hosts() {
        let hosts = vec![
            "web01".to_string(),
            "WEB01".to_string(),
            " ".to_string(),
            "10.0.0.5".to_string(),
        ];
        let state = JobState::new(JobId::from("j"), &hosts);
        assert_eq!(state.hosts, vec!["web01", "10.0.0.5"]);
        assert_eq!(state.declared_host("Web01"), Some("web01"));
        assert_eq!(state.facts.len(), 2);
        assert_eq!(state.status, JobStatus::Pending);
    }
}
