//! Task domain types

use serde::{Deserialize, Serialize};

/// Outcome of one task on one host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Unknown,
    Success,
    Changed,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// Weight used when several results land on one task run
    ///
    /// A loop that fails on one item stays failed whatever the other items
    /// report: failed > changed > skipped > success > unknown.
    pub fn priority(self) -> u8 {
        match self {
            TaskStatus::Unknown => 0,
            TaskStatus::Success => 1,
            TaskStatus::Skipped => 2,
            TaskStatus::Changed => 3,
            TaskStatus::Failed => 4,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Unknown => write!(f, "unknown"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Changed => write!(f, "changed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// A named task as seen for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    pub status: TaskStatus,
}

impl TaskRecord {
    pub fn new(name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Per-status task counts for one host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub completed: usize,
    pub changed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
}

impl TaskSummary {
    pub fn from_records(records: &[TaskRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            match record.status {
                TaskStatus::Success => acc.completed += 1,
                TaskStatus::Changed => acc.changed += 1,
                TaskStatus::Failed => acc.failed += 1,
                TaskStatus::Skipped => acc.skipped += 1,
                TaskStatus::Unknown => acc.pending += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.completed + self.changed + self.failed + self.skipped + self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let records = vec![
            TaskRecord::new("a", TaskStatus::Success),
            TaskRecord::new("b", TaskStatus::Changed),
            TaskRecord::new("c", TaskStatus::Failed),
            TaskRecord::new("d", TaskStatus::Unknown),
        ];
        let summary = TaskSummary::from_records(&records);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.changed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_priority_order() {
        assert!(TaskStatus::Failed.priority() > TaskStatus::Changed.priority());
        assert!(TaskStatus::Changed.priority() > TaskStatus::Skipped.priority());
        assert!(TaskStatus::Skipped.priority() > TaskStatus::Success.priority());
        assert!(TaskStatus::Success.priority() > TaskStatus::Unknown.priority());
    }
}
