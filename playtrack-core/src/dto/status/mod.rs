//! Job status DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobStatus;

/// Response of `GET /api/status/{job_id}`
///
/// Only `status`, `progress` and `output` are relied upon; anything else the
/// console sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub output: Option<String>,
}

impl StatusSnapshot {
    pub fn new(status: &str, progress: f64, output: impl Into<String>) -> Self {
        Self {
            status: Some(status.to_string()),
            progress: Some(progress),
            output: Some(output.into()),
        }
    }

    /// Status to apply for this snapshot
    ///
    /// A missing or unrecognized status reads as `Running`: a malformed
    /// response keeps the job polled and is never mistaken for a terminal one.
    pub fn job_status(&self) -> JobStatus {
        self.status
            .as_deref()
            .and_then(JobStatus::from_remote)
            .unwrap_or(JobStatus::Running)
    }

    /// Reported progress clamped to 0..=100, if present and numeric
    pub fn progress_percent(&self) -> Option<u8> {
        let progress = self.progress?;
        if !progress.is_finite() {
            return None;
        }
        Some(progress.round().clamp(0.0, 100.0) as u8)
    }

    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_snapshot() {
        let snapshot: StatusSnapshot = serde_json::from_str(
            r#"{"status": "running", "progress": 45, "output": "PLAY [all]\n", "playbook": "x.yml"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.job_status(), JobStatus::Running);
        assert_eq!(snapshot.progress_percent(), Some(45));
        assert_eq!(snapshot.output(), "PLAY [all]\n");
    }

    #[test]
    fn test_malformed_snapshot_reads_as_running() {
        let snapshot: StatusSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.job_status(), JobStatus::Running);
        assert_eq!(snapshot.progress_percent(), None);
        assert_eq!(snapshot.output(), "");

        let snapshot: StatusSnapshot =
            serde_json::from_str(r#"{"status": "not_found", "progress": 0}"#).unwrap();
        assert_eq!(snapshot.job_status(), JobStatus::Running);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut snapshot = StatusSnapshot::new("running", 140.0, "");
        assert_eq!(snapshot.progress_percent(), Some(100));
        snapshot.progress = Some(-3.0);
        assert_eq!(snapshot.progress_percent(), Some(0));
        snapshot.progress = Some(f64::NAN);
        assert_eq!(snapshot.progress_percent(), None);
    }
}
