//! Line classification
//!
//! Recognizes the structural lines of `ansible-playbook` output. Patterns are
//! case-insensitive and anchored at the start of the trimmed line, except for
//! `PLAY RECAP` which may appear anywhere (it is often wrapped in markdown
//! stars by the console).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::task::TaskStatus;

static PLAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^PLAY\s*\[(.*)\]").expect("constant regex pattern is valid")
});

static TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:TASK|RUNNING HANDLER)\s*\[(.*)\]").expect("constant regex pattern is valid")
});

static HOST_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(ok|changed|failed|fatal|skipping|unreachable)\s*:\s*\[+([^\]]+)\]")
        .expect("constant regex pattern is valid")
});

static RECAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PLAY\s+RECAP").expect("constant regex pattern is valid"));

/// Raw status tag of a host result line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOutcome {
    Ok,
    Changed,
    Failed,
    Fatal,
    Skipping,
    Unreachable,
}

impl ResultOutcome {
    fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "ok" => Some(ResultOutcome::Ok),
            "changed" => Some(ResultOutcome::Changed),
            "failed" => Some(ResultOutcome::Failed),
            "fatal" => Some(ResultOutcome::Fatal),
            "skipping" => Some(ResultOutcome::Skipping),
            "unreachable" => Some(ResultOutcome::Unreachable),
            _ => None,
        }
    }

    /// Task status this outcome implies
    ///
    /// An unreachable host counts as a failed task.
    pub fn task_status(self) -> TaskStatus {
        match self {
            ResultOutcome::Ok => TaskStatus::Success,
            ResultOutcome::Changed => TaskStatus::Changed,
            ResultOutcome::Failed | ResultOutcome::Fatal | ResultOutcome::Unreachable => {
                TaskStatus::Failed
            }
            ResultOutcome::Skipping => TaskStatus::Skipped,
        }
    }
}

/// Classification of one output line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineEvent {
    Play { name: String },
    Task { name: String },
    HostResult { host: String, outcome: ResultOutcome },
    RecapStart,
    Recap,
    HostRelated { host: String },
    Plain,
    Blank,
}

impl LineEvent {
    pub fn is_recap(&self) -> bool {
        matches!(self, LineEvent::RecapStart | LineEvent::Recap)
    }

    /// Host this line is attributed to, if any
    pub fn host(&self) -> Option<&str> {
        match self {
            LineEvent::HostResult { host, .. } | LineEvent::HostRelated { host } => Some(host),
            _ => None,
        }
    }
}

/// Classifies a single line without any surrounding context
///
/// `hosts` are the declared hosts of the job; host tokens found in the line
/// are reported in their declared spelling. Host results naming an
/// undeclared host keep the host as printed.
pub fn classify_line(line: &str, hosts: &[String]) -> LineEvent {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineEvent::Blank;
    }

    if RECAP.is_match(trimmed) {
        return LineEvent::RecapStart;
    }

    if let Some(caps) = PLAY.captures(trimmed) {
        return LineEvent::Play {
            name: caps[1].trim().to_string(),
        };
    }

    if let Some(caps) = TASK.captures(trimmed) {
        return LineEvent::Task {
            name: caps[1].trim().to_string(),
        };
    }

    if let Some(caps) = HOST_RESULT.captures(trimmed)
        && let Some(outcome) = ResultOutcome::parse(&caps[1])
    {
        // `[web01 -> localhost]` is a delegated task; the result belongs to web01
        let printed = caps[2].split(" -> ").next().unwrap_or_default().trim();
        let host = declared_spelling(printed, hosts).unwrap_or(printed);
        return LineEvent::HostResult {
            host: host.to_string(),
            outcome,
        };
    }

    if let Some(host) = find_host_token(trimmed, hosts) {
        return LineEvent::HostRelated {
            host: host.to_string(),
        };
    }

    LineEvent::Plain
}

fn declared_spelling<'a>(host: &str, hosts: &'a [String]) -> Option<&'a str> {
    hosts
        .iter()
        .find(|h| h.eq_ignore_ascii_case(host))
        .map(String::as_str)
}

/// Longest declared host occurring in `line`, case-insensitively
///
/// Preferring the longest token keeps `10.0.0.50` from being read as `10.0.0.5`.
fn find_host_token<'a>(line: &str, hosts: &'a [String]) -> Option<&'a str> {
    let haystack = line.to_lowercase();
    hosts
        .iter()
        .filter(|h| !h.is_empty() && haystack.contains(&h.to_lowercase()))
        .max_by_key(|h| h.len())
        .map(String::as_str)
}

/// Detail output printed under a host result (indented JSON, `=>` payloads)
fn is_continuation(line: &str) -> bool {
    if line.starts_with(' ') || line.starts_with('\t') || line.contains("=>") {
        return true;
    }
    let trimmed = line.trim_start();
    trimmed.starts_with('{')
        || trimmed.starts_with('}')
        || trimmed.starts_with(']')
        || trimmed.starts_with('"')
        || trimmed.starts_with("...")
}

/// Stateful classifier for a sequential pass over one output
///
/// Adds the context a single line cannot carry: everything after
/// `PLAY RECAP` is recap, and detail lines following a host result are
/// attributed to that host until the next play or task header.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    hosts: Vec<String>,
    in_recap: bool,
    current_host: Option<String>,
}

impl LineClassifier {
    pub fn new(hosts: &[String]) -> Self {
        Self {
            hosts: hosts.to_vec(),
            in_recap: false,
            current_host: None,
        }
    }

    /// Most recent host a result or host-related line was attributed to
    pub fn current_host(&self) -> Option<&str> {
        self.current_host.as_deref()
    }

    pub fn next(&mut self, line: &str) -> LineEvent {
        if self.in_recap {
            return LineEvent::Recap;
        }

        let event = classify_line(line, &self.hosts);
        match &event {
            LineEvent::RecapStart => {
                self.in_recap = true;
                self.current_host = None;
            }
            LineEvent::Play { .. } | LineEvent::Task { .. } => {
                self.current_host = None;
            }
            LineEvent::HostResult { host, .. } | LineEvent::HostRelated { host } => {
                self.current_host = Some(host.clone());
            }
            LineEvent::Plain => {
                if let Some(host) = &self.current_host
                    && is_continuation(line)
                {
                    return LineEvent::HostRelated { host: host.clone() };
                }
            }
            LineEvent::Recap | LineEvent::Blank => {}
        }
        event
    }
}
