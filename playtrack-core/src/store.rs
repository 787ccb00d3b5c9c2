//! Job state store
//!
//! Holds the parsed state of every tracked job. All derived data (partition,
//! facts, tasks, recap) is rebuilt from the accumulated output whenever the
//! output changes, so the result never depends on how the output was split
//! across snapshots.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::domain::facts::Facts;
use crate::domain::job::{JobId, JobState, JobStatus};
use crate::domain::recap::RecapStats;
use crate::domain::task::{TaskRecord, TaskStatus};
use crate::dto::status::StatusSnapshot;
use crate::parse::classify::LineEvent;
use crate::parse::facts::FactExtractor;
use crate::parse::partition::partition;
use crate::parse::tasks::build_tasks;

/// How the `output` field of successive snapshots relates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Every snapshot carries the whole output so far
    #[default]
    Cumulative,
    /// Snapshots carry only what was printed since the previous one
    Incremental,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cumulative" => Ok(OutputMode::Cumulative),
            "incremental" => Ok(OutputMode::Incremental),
            other => Err(format!("unknown output mode: {}", other)),
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Cumulative => write!(f, "cumulative"),
            OutputMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// What one ingest did to a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// The job was not known before this ingest
    pub created: bool,
    /// Anything observable changed
    pub changed: bool,
    pub status: JobStatus,
    pub progress: u8,
    pub revision: u64,
}

impl IngestOutcome {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// In-memory map of job id to parsed job state
#[derive(Debug, Default)]
pub struct JobStateStore {
    jobs: HashMap<JobId, JobState>,
    mode: OutputMode,
    extractor: FactExtractor,
}

impl JobStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Creates an empty pending job unless it already exists
    ///
    /// Returns true if the job was created. Hosts of an existing job are
    /// never changed.
    pub fn register(&mut self, job_id: &JobId, hosts: &[String]) -> bool {
        if self.jobs.contains_key(job_id) {
            return false;
        }
        debug!("Registering job {} for {} host(s)", job_id, hosts.len());
        self.jobs
            .insert(job_id.clone(), JobState::new(job_id.clone(), hosts));
        true
    }

    /// Applies one status snapshot to a job, creating it if needed
    ///
    /// `hosts` is only used when the job is created.
    pub fn ingest(
        &mut self,
        job_id: &JobId,
        hosts: &[String],
        snapshot: &StatusSnapshot,
    ) -> IngestOutcome {
        let created = self.register(job_id, hosts);
        let mode = self.mode;
        let extractor = self.extractor;
        let state = self
            .jobs
            .entry(job_id.clone())
            .or_insert_with(|| JobState::new(job_id.clone(), hosts));

        let mut changed = created;

        let status = state.status.advance(snapshot.job_status());
        if status != state.status {
            debug!("Job {} status {} -> {}", job_id, state.status, status);
            state.status = status;
            changed = true;
        }

        let progress = if status.is_terminal() {
            100
        } else {
            snapshot
                .progress_percent()
                .map_or(state.progress, |p| p.max(state.progress))
        };
        if progress != state.progress {
            state.progress = progress;
            changed = true;
        }

        if merge_output(&mut state.raw_output, snapshot.output(), mode) {
            reproject(state, &extractor);
            changed = true;
        }

        if changed {
            state.revision += 1;
            state.updated_at = Utc::now();
        }

        IngestOutcome {
            created,
            changed,
            status: state.status,
            progress: state.progress,
            revision: state.revision,
        }
    }

    pub fn get(&self, job_id: &JobId) -> Option<&JobState> {
        self.jobs.get(job_id)
    }

    /// Drops a job and everything derived from it
    pub fn forget(&mut self, job_id: &JobId) -> Option<JobState> {
        let removed = self.jobs.remove(job_id);
        if removed.is_some() {
            debug!("Forgot job {}", job_id);
        }
        removed
    }

    /// Ids of all stored jobs, sorted
    pub fn job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Folds `incoming` into the stored output; returns true if it changed
///
/// Empty output never clears what is stored.
fn merge_output(stored: &mut String, incoming: &str, mode: OutputMode) -> bool {
    if incoming.is_empty() || incoming == stored.as_str() {
        return false;
    }
    match mode {
        OutputMode::Cumulative => *stored = incoming.to_string(),
        OutputMode::Incremental => {
            if incoming.starts_with(stored.as_str()) {
                *stored = incoming.to_string();
            } else {
                stored.push_str(incoming);
            }
        }
    }
    true
}

/// Rebuilds partition, facts, tasks and recap from `raw_output`
fn reproject(state: &mut JobState, extractor: &FactExtractor) {
    state.partition = partition(&state.raw_output, &state.hosts);

    let shared_text = state.partition.shared_text();
    let shared_labeled = extractor.extract_labeled(&shared_text);
    let shared_fallback = extractor.extract_fallback(&shared_text);

    for host in &state.hosts {
        let host_text = state.partition.host_text(host);
        let mut found = extractor.extract_labeled(&host_text);
        found.fill_missing(&shared_labeled);
        found.fill_missing(&extractor.extract_fallback(&host_text));
        found.fill_missing(&shared_fallback);

        state
            .facts
            .entry(host.clone())
            .or_insert_with(Facts::default)
            .merge_from(&found);

        let rebuilt = build_tasks(state.partition.host_lines(host));
        merge_tasks(state.tasks.entry(host.clone()).or_default(), rebuilt);
    }

    let recap: Vec<(String, RecapStats)> = state
        .partition
        .shared
        .iter()
        .filter(|line| line.event == LineEvent::Recap)
        .filter_map(|line| RecapStats::parse_line(&line.text))
        .collect();
    for (printed, stats) in recap {
        let host = state
            .declared_host(&printed)
            .map(str::to_string)
            .unwrap_or(printed);
        state.recap.insert(host, stats);
    }
}

/// Updates `existing` with a freshly built task list
///
/// Records are never dropped and a known status is never reset to unknown.
fn merge_tasks(existing: &mut Vec<TaskRecord>, rebuilt: Vec<TaskRecord>) {
    for record in rebuilt {
        match existing.iter_mut().find(|r| r.name == record.name) {
            Some(current) => {
                if record.status != TaskStatus::Unknown {
                    current.status = record.status;
                }
            }
            None => existing.push(record),
        }
    }
}
