//! Watch command
//!
//! Tracks a job on the console and prints its output as it arrives.

use anyhow::{Context, Result};
use colored::*;
use playtrack_core::JobId;
use playtrack_core::render::project_host;
use playtrack_core::run::RunAggregate;
use playtrack_sync::{PollingSynchronizer, SyncEvent};
use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::commands::print::{colorize_status, lines_from, print_lines, print_progress, print_state};
use crate::config::Config;

pub struct WatchOptions {
    pub interval_ms: Option<u64>,
    pub per_host: bool,
    pub json: bool,
}

/// Follow `job_id` until every tracked job stops or Ctrl-C is pressed
pub async fn watch_job(
    config: &Config,
    job_id: &str,
    hosts: &[String],
    options: WatchOptions,
) -> Result<()> {
    let sync_config = config.sync_config(options.interval_ms)?;
    let sync = PollingSynchronizer::from_config(&sync_config)
        .context("Failed to set up the synchronizer")?;
    let mut events = sync.subscribe();

    let master = JobId::from(job_id);
    let mut run = (options.per_host && !hosts.is_empty())
        .then(|| RunAggregate::new(master.clone(), hosts));

    // Sub-job id -> hosts it covers
    let targets: Vec<(JobId, Vec<String>)> = match &run {
        Some(run) => run
            .members()
            .iter()
            .map(|(host, id)| (id.clone(), vec![host.clone()]))
            .collect(),
        None => vec![(master.clone(), hosts.to_vec())],
    };

    if !options.json {
        println!(
            "{} {} on {}",
            "Watching".bold(),
            master.as_str().cyan(),
            sync_config.console_url.dimmed()
        );
    }

    let mut pending: HashSet<JobId> = targets.iter().map(|(id, _)| id.clone()).collect();
    for (id, target_hosts) in &targets {
        sync.start_tracking(id, target_hosts, sync_config.poll_interval);
    }

    let mut printed: HashMap<JobId, usize> = HashMap::new();
    let single = targets.len() == 1;

    while !pending.is_empty() {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Interrupted, stopping.".yellow());
                sync.shutdown();
                break;
            }
        };

        let event = match event {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                debug!("Skipped {} synchronizer event(s)", skipped);
                forget_stopped(&mut pending, &sync);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            SyncEvent::Updated { job_id, .. } => {
                if options.json {
                    continue;
                }
                if single {
                    let from = printed.get(&job_id).copied().unwrap_or(0);
                    // Copy out under the lock, print after releasing it
                    let snapshot = {
                        let store = sync.store();
                        let store = store.lock();
                        store
                            .get(&job_id)
                            .map(|state| (lines_from(state, from), state.progress, state.status))
                    };
                    let Some(((lines, seen), progress, status)) = snapshot else {
                        continue;
                    };
                    print_lines(&lines);
                    print_progress(progress, status);
                    printed.insert(job_id, seen);
                } else if let Some(run) = run.as_mut() {
                    let progress = {
                        let store = sync.store();
                        let store = store.lock();
                        run.update(&store)
                    };
                    println!(
                        "{} {} {}% ({}/{} hosts finished) {}",
                        "▸".cyan(),
                        run.master(),
                        progress.progress,
                        progress.finished,
                        progress.total,
                        colorize_status(progress.status)
                    );
                }
            }
            SyncEvent::Stopped { job_id, status } => {
                if !options.json {
                    println!(
                        "{} {} {}",
                        "■".bold(),
                        job_id.as_str().cyan(),
                        colorize_status(status)
                    );
                }
                pending.remove(&job_id);
            }
            SyncEvent::FetchFailed { job_id, message } => {
                if !options.json {
                    println!("{} {}: {}", "⚠".yellow(), job_id, message.dimmed());
                }
            }
        }
    }

    report(&sync, &targets, options.json)
}

/// Drops jobs the synchronizer no longer tracks
///
/// Used after missed events: a lost `Stopped` would otherwise keep the
/// watch waiting on a job nobody polls any more.
fn forget_stopped(pending: &mut HashSet<JobId>, sync: &PollingSynchronizer) {
    pending.retain(|id| sync.is_tracking(id));
}

/// Print the final state of every tracked job
fn report(sync: &PollingSynchronizer, targets: &[(JobId, Vec<String>)], json: bool) -> Result<()> {
    let store = sync.store();
    let store = store.lock();

    if json {
        let views: Vec<_> = targets
            .iter()
            .filter_map(|(id, _)| store.get(id))
            .flat_map(|state| {
                state
                    .hosts
                    .iter()
                    .filter_map(|host| project_host(state, host))
                    .collect::<Vec<_>>()
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!();
    for (id, _) in targets {
        if let Some(state) = store.get(id) {
            print_state(state);
        }
    }
    Ok(())
}
