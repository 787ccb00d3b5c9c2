//! Per-host partitioning of combined output
//!
//! A multi-host run prints one interleaved stream. Partitioning routes each
//! line to a shared bucket (play/task headers, recap, unattributed text) or to
//! the bucket of the host it belongs to, so a single host's view can be
//! rebuilt without the noise of the others.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::parse::classify::{LineClassifier, LineEvent, ResultOutcome};

/// One line routed to a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionLine {
    /// Zero-based index of the line in the source output
    pub number: usize,
    pub text: String,
    pub event: LineEvent,
    /// Copy of a task header placed in a host bucket ahead of its results;
    /// the original line lives in the shared bucket
    pub echo: bool,
}

impl PartitionLine {
    /// Ordering rank used when re-interleaving a host view
    fn rank(&self) -> u8 {
        match self.event {
            LineEvent::Play { .. } => 0,
            LineEvent::Task { .. } => 1,
            LineEvent::RecapStart | LineEvent::Recap => 3,
            _ => 2,
        }
    }
}

/// Output split into a shared bucket and one bucket per declared host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub shared: Vec<PartitionLine>,
    pub by_host: IndexMap<String, Vec<PartitionLine>>,
}

impl Partition {
    /// Empty partition with a bucket for every host
    pub fn empty(hosts: &[String]) -> Self {
        Self {
            shared: Vec::new(),
            by_host: hosts.iter().map(|h| (h.clone(), Vec::new())).collect(),
        }
    }

    pub fn host_lines(&self, host: &str) -> &[PartitionLine] {
        self.by_host.get(host).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn shared_text(&self) -> String {
        join_lines(&self.shared)
    }

    pub fn host_text(&self, host: &str) -> String {
        join_lines(self.host_lines(host))
    }

    /// Number of source lines held, echo copies excluded
    pub fn source_line_count(&self) -> usize {
        self.shared.len()
            + self
                .by_host
                .values()
                .flatten()
                .filter(|line| !line.echo)
                .count()
    }
}

fn join_lines(lines: &[PartitionLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits `raw` into shared and per-host buckets
///
/// Host results go to their host's bucket, preceded by an echo of the task
/// header that produced them (once per task and host). A host that already
/// reported in the current play gets the echo as soon as the header is
/// printed, so the running task shows up before its result; a failed or
/// unreachable host drops out until it reports again. Detail lines follow
/// the most recent host. Results for hosts that were not declared stay in
/// the shared bucket.
pub fn partition(raw: &str, hosts: &[String]) -> Partition {
    let mut result = Partition::empty(hosts);
    let mut classifier = LineClassifier::new(hosts);
    let mut current_task: Option<(usize, String, LineEvent)> = None;
    let mut last_echoed: HashMap<String, usize> = HashMap::new();
    // Hosts still running tasks in the current play
    let mut active: IndexSet<String> = IndexSet::new();

    for (number, text) in raw.lines().enumerate() {
        let event = classifier.next(text);
        let line = PartitionLine {
            number,
            text: text.to_string(),
            event: event.clone(),
            echo: false,
        };

        match &event {
            LineEvent::Task { .. } => {
                result.shared.push(line);
                for host in &active {
                    if let Some(bucket) = result.by_host.get_mut(host) {
                        bucket.push(PartitionLine {
                            number,
                            text: text.to_string(),
                            event: event.clone(),
                            echo: true,
                        });
                        last_echoed.insert(host.clone(), number);
                    }
                }
                current_task = Some((number, text.to_string(), event.clone()));
            }
            LineEvent::Play { .. } => {
                current_task = None;
                active.clear();
                result.shared.push(line);
            }
            LineEvent::HostResult { host, outcome } => match result.by_host.get_mut(host) {
                Some(bucket) => {
                    if let Some((task_number, task_text, task_event)) = &current_task
                        && last_echoed.get(host) != Some(task_number)
                    {
                        bucket.push(PartitionLine {
                            number: *task_number,
                            text: task_text.clone(),
                            event: task_event.clone(),
                            echo: true,
                        });
                        last_echoed.insert(host.clone(), *task_number);
                    }
                    bucket.push(line);
                    match outcome {
                        ResultOutcome::Failed | ResultOutcome::Fatal | ResultOutcome::Unreachable => {
                            active.shift_remove(host);
                        }
                        _ => {
                            active.insert(host.clone());
                        }
                    }
                }
                None => result.shared.push(line),
            },
            LineEvent::HostRelated { host } => match result.by_host.get_mut(host) {
                Some(bucket) => bucket.push(line),
                None => result.shared.push(line),
            },
            _ => result.shared.push(line),
        }
    }

    result
}

/// Lines to display for one host
///
/// Shared and host lines are merged (echo copies dropped, their originals
/// are in the shared bucket) and stably ordered: play headers first, task
/// headers next, recap last, everything else in source order between.
pub fn host_view<'a>(partition: &'a Partition, host: &str) -> Vec<&'a PartitionLine> {
    let mut lines: Vec<&PartitionLine> = partition
        .shared
        .iter()
        .chain(partition.host_lines(host).iter().filter(|line| !line.echo))
        .collect();
    lines.sort_by_key(|line| (line.rank(), line.number));
    lines
}
