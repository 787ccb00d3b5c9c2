//! Playtrack HTTP Client
//!
//! A small, typed HTTP client for the execution console that runs playbooks.
//!
//! The synchronizer only depends on the [`StatusSource`] trait, so tests and
//! offline tools can feed snapshots without a console.
//!
//! # Example
//!
//! ```no_run
//! use playtrack_client::ConsoleClient;
//! use playtrack_core::JobId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConsoleClient::new("http://localhost:5000");
//!
//!     let snapshot = client.get_status(&JobId::from("baseline.yml_20240101_120000")).await?;
//!     println!("status: {}", snapshot.job_status());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod source;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use playtrack_core::dto::status::StatusSnapshot;
pub use source::StatusSource;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the execution console API
///
/// Covers the two endpoints the tracker needs:
/// - Job status polling
/// - Job cancellation
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    /// Base URL of the console (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ConsoleClient {
    /// Create a new console client
    ///
    /// # Example
    /// ```
    /// use playtrack_client::ConsoleClient;
    ///
    /// let client = ConsoleClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new console client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a console client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the console
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
