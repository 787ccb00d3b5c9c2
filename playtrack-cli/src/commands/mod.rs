//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod cancel;
mod parse;
mod print;
mod status;
mod watch;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Follow a job until it finishes
    Watch {
        /// Job ID as issued by the console
        job_id: String,

        /// Host the playbook runs against (repeatable)
        #[arg(long = "host")]
        hosts: Vec<String>,

        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Track one sub-job per host (`<job-id>-<host>`) instead of one combined job
        #[arg(long)]
        per_host: bool,

        /// Print the final per-host views as JSON instead of coloured text
        #[arg(long)]
        json: bool,
    },
    /// Show the current status of a job
    Status {
        /// Job ID as issued by the console
        job_id: String,

        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a saved playbook log offline
    Parse {
        /// Path to the log file
        file: PathBuf,

        /// Host the playbook ran against (repeatable)
        #[arg(long = "host")]
        hosts: Vec<String>,

        /// Print the per-host views as JSON instead of coloured text
        #[arg(long)]
        json: bool,
    },
    /// Ask the console to cancel a job
    Cancel {
        /// Job ID as issued by the console
        job_id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Watch {
            job_id,
            hosts,
            interval_ms,
            per_host,
            json,
        } => {
            let options = watch::WatchOptions {
                interval_ms,
                per_host,
                json,
            };
            watch::watch_job(config, &job_id, &hosts, options).await
        }
        Commands::Status { job_id, json } => status::show_status(config, &job_id, json).await,
        Commands::Parse { file, hosts, json } => parse::parse_file(&file, &hosts, json),
        Commands::Cancel { job_id } => cancel::cancel_job(config, &job_id).await,
    }
}
