//! Playtrack CLI
//!
//! Command-line interface for following Ansible playbook runs on the
//! execution console.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "playtrack")]
#[command(about = "Follow Ansible playbook runs and their per-host results", long_about = None)]
struct Cli {
    /// Execution console URL
    #[arg(
        long,
        env = "PLAYTRACK_CONSOLE_URL",
        default_value = "http://localhost:5000"
    )]
    console_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playtrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        console_url: cli.console_url,
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_args() {
        let cli = Cli::try_parse_from([
            "playtrack",
            "--console-url",
            "http://console:5000",
            "watch",
            "baseline.yml_20240101_120000",
            "--host",
            "web01",
            "--host",
            "10.0.0.5",
            "--interval-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(cli.console_url, "http://console:5000");
        match cli.command {
            Commands::Watch {
                job_id,
                hosts,
                interval_ms,
                per_host,
                json,
            } => {
                assert_eq!(job_id, "baseline.yml_20240101_120000");
                assert_eq!(hosts, vec!["web01", "10.0.0.5"]);
                assert_eq!(interval_ms, Some(500));
                assert!(!per_host);
                assert!(!json);
            }
            _ => panic!("expected watch command"),
        }
    }

    #[test]
    fn test_watch_requires_job_id() {
        assert!(Cli::try_parse_from(["playtrack", "watch"]).is_err());
    }
}
