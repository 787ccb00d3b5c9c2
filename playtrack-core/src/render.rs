//! Display models
//!
//! Pure projections of job state for a presentation layer. Nothing here
//! writes back to the store: the `"N/A"` placeholders and escaped text only
//! exist in the returned values.

use serde::Serialize;

use crate::domain::facts::Facts;
use crate::domain::job::{JobState, JobStatus};
use crate::domain::recap::RecapStats;
use crate::domain::task::{TaskRecord, TaskStatus, TaskSummary};
use crate::parse::classify::{LineClassifier, LineEvent, ResultOutcome};
use crate::parse::partition::host_view;

/// Placeholder for a fact that has not been found
pub const NOT_AVAILABLE: &str = "N/A";

/// The configuration summary card of one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryFields {
    pub hostname: String,
    pub system: String,
    pub private_ip: String,
    pub public_ip: String,
    pub partner_user: String,
    pub partner_password: String,
    pub root_user: String,
    pub root_password: String,
}

impl SummaryFields {
    /// Label/value pairs in display order
    pub fn rows(&self) -> [(&'static str, &str); 8] {
        [
            ("Hostname", self.hostname.as_str()),
            ("Sistema", self.system.as_str()),
            ("IP Privado", self.private_ip.as_str()),
            ("IP Público", self.public_ip.as_str()),
            ("Usuário parceiro", self.partner_user.as_str()),
            ("Senha parceiro", self.partner_password.as_str()),
            ("Usuário root", self.root_user.as_str()),
            ("Senha root", self.root_password.as_str()),
        ]
    }
}

fn or_not_available(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

pub fn project_summary(facts: &Facts) -> SummaryFields {
    SummaryFields {
        hostname: or_not_available(&facts.hostname),
        system: or_not_available(&facts.system),
        private_ip: or_not_available(&facts.private_ip),
        public_ip: or_not_available(&facts.public_ip),
        partner_user: or_not_available(&facts.partner_user),
        partner_password: or_not_available(&facts.partner_password),
        root_user: or_not_available(&facts.root_user),
        root_password: or_not_available(&facts.root_password),
    }
}

/// Visual class of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Play,
    Task,
    Ok,
    Changed,
    Failed,
    Skipped,
    Recap,
    Plain,
}

/// One output line ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedLine {
    /// HTML-escaped line text
    pub text: String,
    pub severity: Severity,
}

/// Escapes text for safe insertion into HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Severity of a line given its classification
pub fn line_severity(event: &LineEvent, text: &str) -> Severity {
    match event {
        LineEvent::Play { .. } => Severity::Play,
        LineEvent::Task { .. } => Severity::Task,
        LineEvent::RecapStart | LineEvent::Recap => Severity::Recap,
        LineEvent::HostResult { outcome, .. } => match outcome {
            ResultOutcome::Ok => Severity::Ok,
            ResultOutcome::Changed => Severity::Changed,
            ResultOutcome::Skipping => Severity::Skipped,
            ResultOutcome::Failed | ResultOutcome::Fatal | ResultOutcome::Unreachable => {
                Severity::Failed
            }
        },
        _ if text.contains("FAILED!") || text.contains("ERROR!") => Severity::Failed,
        _ => Severity::Plain,
    }
}

/// Classifies and escapes a run of consecutive output lines
pub fn project_lines(lines: &[&str]) -> Vec<FormattedLine> {
    let mut classifier = LineClassifier::new(&[]);
    lines
        .iter()
        .map(|line| {
            let event = classifier.next(line);
            FormattedLine {
                text: escape_html(line),
                severity: line_severity(&event, line),
            }
        })
        .collect()
}

/// One row of a host's task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskLine {
    pub name: String,
    pub status: TaskStatus,
    pub icon: &'static str,
}

pub fn task_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Success => "✓",
        TaskStatus::Changed => "↻",
        TaskStatus::Failed => "✗",
        TaskStatus::Skipped => "⤼",
        TaskStatus::Unknown => "…",
    }
}

pub fn project_tasks(tasks: &[TaskRecord]) -> Vec<TaskLine> {
    tasks
        .iter()
        .map(|task| TaskLine {
            name: escape_html(&task.name),
            status: task.status,
            icon: task_icon(task.status),
        })
        .collect()
}

/// Everything a per-host panel shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostView {
    pub host: String,
    pub status: JobStatus,
    pub progress: u8,
    pub summary: SummaryFields,
    pub lines: Vec<FormattedLine>,
    pub tasks: Vec<TaskLine>,
    pub task_summary: TaskSummary,
    pub recap: Option<RecapStats>,
}

/// Projects one host of a job
///
/// Returns `None` if `host` was not declared for the job.
pub fn project_host(state: &JobState, host: &str) -> Option<HostView> {
    let host = state.declared_host(host)?;

    let facts = state.facts.get(host).cloned().unwrap_or_default();
    let records = state.tasks.get(host).map(Vec::as_slice).unwrap_or_default();
    let lines: Vec<FormattedLine> = host_view(&state.partition, host)
        .into_iter()
        .map(|line| FormattedLine {
            text: escape_html(&line.text),
            severity: line_severity(&line.event, &line.text),
        })
        .collect();

    Some(HostView {
        host: host.to_string(),
        status: state.status,
        progress: state.progress,
        summary: project_summary(&facts),
        lines,
        tasks: project_tasks(records),
        task_summary: TaskSummary::from_records(records),
        recap: state.recap.get(host).copied(),
    })
}
