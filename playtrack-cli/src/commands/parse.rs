//! Parse command
//!
//! Runs the engine over a saved log, without any console.

use anyhow::{Context, Result};
use playtrack_core::dto::status::StatusSnapshot;
use playtrack_core::render::project_host;
use playtrack_core::{JobId, JobStateStore};
use std::path::Path;

use crate::commands::print::{print_lines_from, print_state};

pub fn parse_file(file: &Path, hosts: &[String], json: bool) -> Result<()> {
    let output = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let job_id = JobId::from(
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string()),
    );
    let snapshot = StatusSnapshot {
        output: Some(output),
        ..StatusSnapshot::default()
    };

    let mut store = JobStateStore::new();
    store.ingest(&job_id, hosts, &snapshot);
    let state = store
        .get(&job_id)
        .context("Parsed job missing from store")?;

    if json {
        let views: Vec<_> = state
            .hosts
            .iter()
            .filter_map(|host| project_host(state, host))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    print_lines_from(state, 0);
    println!();
    print_state(state);
    Ok(())
}
