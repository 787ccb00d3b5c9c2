//! Status command

use anyhow::{Context, Result};
use colored::*;
use playtrack_client::ConsoleClient;
use playtrack_core::JobId;

use crate::commands::print::colorize_status;
use crate::config::Config;

/// Fetch one snapshot of a job and print it
pub async fn show_status(config: &Config, job_id: &str, json: bool) -> Result<()> {
    let client = ConsoleClient::new(&config.console_url);
    let job_id = JobId::from(job_id);

    let snapshot = client
        .get_status(&job_id)
        .await
        .with_context(|| format!("Failed to fetch status of job {}", job_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", "Job Status:".bold());
    println!("  ID:       {}", job_id.as_str().cyan());
    println!("  Status:   {}", colorize_status(snapshot.job_status()));
    match snapshot.progress_percent() {
        Some(progress) => println!("  Progress: {}%", progress),
        None => println!("  Progress: {}", "unknown".dimmed()),
    }
    let lines = snapshot.output().lines().count();
    println!("  Output:   {} line(s)", lines);

    Ok(())
}
