//! Terminal output helpers shared by the commands

use colored::*;
use playtrack_core::domain::task::TaskSummary;
use playtrack_core::parse::{FactExtractor, PartitionLine};
use playtrack_core::render::{Severity, SummaryFields, line_severity, project_summary, task_icon};
use playtrack_core::{JobState, JobStatus, TaskStatus};

/// Colorize job status for display
pub fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
    }
}

fn colorize_line(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Play => text.bold(),
        Severity::Task => text.cyan(),
        Severity::Ok => text.green(),
        Severity::Changed => text.yellow(),
        Severity::Failed => text.red(),
        Severity::Skipped => text.blue(),
        Severity::Recap => text.magenta(),
        Severity::Plain => text.normal(),
    }
}

/// Source lines of a job in output order, echo copies excluded
pub fn source_lines(state: &JobState) -> Vec<&PartitionLine> {
    let mut lines: Vec<&PartitionLine> = state
        .partition
        .shared
        .iter()
        .chain(state.partition.by_host.values().flatten())
        .filter(|line| !line.echo)
        .collect();
    lines.sort_by_key(|line| line.number);
    lines
}

/// Output lines numbered `from` and above, with their severity
///
/// Also returns the number of source lines seen so far, to pass back as
/// `from` next time.
pub fn lines_from(state: &JobState, from: usize) -> (Vec<(String, Severity)>, usize) {
    let lines = source_lines(state);
    // Output was replaced by a shorter one; start over
    let from = if lines.len() < from { 0 } else { from };
    let fresh = lines
        .iter()
        .filter(|line| line.number >= from)
        .map(|line| (line.text.clone(), line_severity(&line.event, &line.text)))
        .collect();
    (fresh, lines.len())
}

pub fn print_lines(lines: &[(String, Severity)]) {
    for (text, severity) in lines {
        println!("{}", colorize_line(text, *severity));
    }
}

/// Prints the output lines numbered `from` and above
///
/// Returns the number of lines printed so far, to pass back as `from`.
pub fn print_lines_from(state: &JobState, from: usize) -> usize {
    let (lines, seen) = lines_from(state, from);
    print_lines(&lines);
    seen
}

pub fn print_progress(progress: u8, status: JobStatus) {
    let filled = usize::from(progress) / 5;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
    println!(
        "{} {} {:>3}% {}",
        "▸".cyan(),
        bar,
        progress,
        colorize_status(status)
    );
}

fn print_summary(summary: &SummaryFields) {
    for (label, value) in summary.rows() {
        println!("    {:<17} {}", format!("{}:", label), value);
    }
}

fn colorize_task(icon: &str, status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Success => icon.green(),
        TaskStatus::Changed => icon.yellow(),
        TaskStatus::Failed => icon.red(),
        TaskStatus::Skipped => icon.blue(),
        TaskStatus::Unknown => icon.dimmed(),
    }
}

/// Print summary card, task list and recap of one host
pub fn print_host(state: &JobState, host: &str) {
    println!("{} {}", "Host".bold(), host.bold().cyan());

    let facts = state.facts.get(host).cloned().unwrap_or_default();
    println!("  {}", "Summary:".bold());
    print_summary(&project_summary(&facts));

    let tasks = state.tasks.get(host).map(Vec::as_slice).unwrap_or_default();
    if !tasks.is_empty() {
        let counts = TaskSummary::from_records(tasks);
        println!(
            "  {} {} ok, {} changed, {} failed, {} skipped, {} pending",
            "Tasks:".bold(),
            counts.completed,
            counts.changed,
            counts.failed,
            counts.skipped,
            counts.pending
        );
        for task in tasks {
            println!(
                "    {} {}",
                colorize_task(task_icon(task.status), task.status),
                task.name
            );
        }
    }

    if let Some(recap) = state.recap.get(host) {
        let verdict = if recap.is_clean() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} {} ok={} changed={} unreachable={} failed={} skipped={}",
            "Recap:".bold(),
            verdict,
            recap.ok,
            recap.changed,
            recap.unreachable,
            recap.failed,
            recap.skipped
        );
    }
    println!();
}

/// Print every host of a job, or whole-output facts when no host was given
pub fn print_state(state: &JobState) {
    println!("{}", format!("Job {}", state.id).bold());
    println!("  Status:   {}", colorize_status(state.status));
    println!("  Progress: {}%", state.progress);
    println!();

    if state.hosts.is_empty() {
        let facts = FactExtractor::new().extract(&state.raw_output);
        println!("  {}", "Summary (no hosts declared):".bold());
        print_summary(&project_summary(&facts));
        return;
    }

    for host in &state.hosts {
        print_host(state, host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtrack_core::dto::status::StatusSnapshot;
    use playtrack_core::{JobId, JobStateStore};

    #[test]
    fn test_source_lines_in_output_order() {
        let raw = "TASK [a]\nok: [web01]\nok: [web02]\nTASK [b]\nchanged: [web01]";
        let hosts = vec!["web01".to_string(), "web02".to_string()];
        let job = JobId::from("j");
        let mut store = JobStateStore::new();
        store.ingest(&job, &hosts, &StatusSnapshot::new("running", 10.0, raw));

        let state = store.get(&job).unwrap();
        let texts: Vec<&str> = source_lines(state)
            .iter()
            .map(|line| line.text.as_str())
            .collect();
        assert_eq!(texts, raw.lines().collect::<Vec<_>>());
    }

    #[test]
    fn test_lines_from_skips_printed_lines() {
        let raw = "TASK [a]\nok: [web01]\nfailed: [web01]";
        let hosts = vec!["web01".to_string()];
        let job = JobId::from("j");
        let mut store = JobStateStore::new();
        store.ingest(&job, &hosts, &StatusSnapshot::new("running", 10.0, raw));

        let state = store.get(&job).unwrap();
        let (lines, seen) = lines_from(state, 1);
        assert_eq!(seen, 3);
        assert_eq!(
            lines,
            vec![
                ("ok: [web01]".to_string(), Severity::Ok),
                ("failed: [web01]".to_string(), Severity::Failed),
            ]
        );
        assert_eq!(lines_from(state, 10).0.len(), 3);
    }
}
