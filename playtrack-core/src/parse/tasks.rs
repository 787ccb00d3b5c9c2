//! Task list reconstruction

use crate::domain::task::{TaskRecord, TaskStatus};
use crate::parse::classify::LineEvent;
use crate::parse::partition::PartitionLine;

/// Builds the ordered task list of a host from its view lines
///
/// Tasks keep the position of their first header; a header seen again
/// (repeated plays, includes) reuses the existing record. Within one
/// header occurrence the first result sets the status and later results
/// can only raise it by [`TaskStatus::priority`], so a loop item that
/// failed keeps the task failed. A new occurrence starts over.
pub fn build_tasks<'a, I>(lines: I) -> Vec<TaskRecord>
where
    I: IntoIterator<Item = &'a PartitionLine>,
{
    let mut records: Vec<TaskRecord> = Vec::new();
    // Index of the open task and whether it has a result in this occurrence
    let mut current: Option<(usize, bool)> = None;

    for line in lines {
        match &line.event {
            LineEvent::Task { name } => {
                let index = match records.iter().position(|r| &r.name == name) {
                    Some(index) => index,
                    None => {
                        records.push(TaskRecord::new(name.clone(), TaskStatus::Unknown));
                        records.len() - 1
                    }
                };
                current = Some((index, false));
            }
            LineEvent::Play { .. } => current = None,
            LineEvent::HostResult { outcome, .. } => {
                if let Some((index, seen)) = current.as_mut() {
                    let status = outcome.task_status();
                    let record = &mut records[*index];
                    if !*seen || status.priority() > record.status.priority() {
                        record.status = status;
                    }
                    *seen = true;
                }
            }
            _ => {}
        }
    }

    records
}
