//! Cancel command

use anyhow::{Context, Result};
use colored::*;
use playtrack_client::ConsoleClient;
use playtrack_core::JobId;

use crate::config::Config;

/// Ask the console to cancel `job_id`
pub async fn cancel_job(config: &Config, job_id: &str) -> Result<()> {
    let client = ConsoleClient::new(&config.console_url);
    let job_id = JobId::from(job_id);

    let response = client
        .cancel_job(&job_id)
        .await
        .with_context(|| format!("Failed to cancel job {}", job_id))?;

    if response.success {
        println!("{} Cancellation requested for {}", "✓".green(), job_id.as_str().cyan());
        Ok(())
    } else {
        let reason = response
            .error
            .unwrap_or_else(|| "console refused the request".to_string());
        println!("{} Could not cancel {}: {}", "✗".red(), job_id.as_str().cyan(), reason);
        anyhow::bail!("cancellation of job {} was rejected", job_id)
    }
}
