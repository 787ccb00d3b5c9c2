//! Job-related API endpoints

use crate::ConsoleClient;
use crate::error::{ClientError, Result};
use playtrack_core::JobId;
use playtrack_core::dto::cancel::{CancelRequest, CancelResponse};
use playtrack_core::dto::status::StatusSnapshot;
use tracing::debug;

impl ConsoleClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// Fetch the current status snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - The job id as issued by the console
    ///
    /// # Returns
    /// Status, progress and the output printed so far
    pub async fn get_status(&self, job_id: &JobId) -> Result<StatusSnapshot> {
        let url = self.job_url("api/status", job_id)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Job Control
    // =============================================================================

    /// Ask the console to cancel a running job
    ///
    /// A `success: false` answer is returned as-is; the caller decides how
    /// to report it.
    pub async fn cancel_job(&self, job_id: &JobId) -> Result<CancelResponse> {
        if job_id.as_str().trim().is_empty() {
            return Err(ClientError::InvalidRequest("empty job id".to_string()));
        }
        let url = format!("{}/api/cancel", self.base_url);
        let req = CancelRequest {
            job_id: job_id.clone(),
        };
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// `{base}/{prefix}/{job_id}` with the id percent-encoded as one path segment
    fn job_url(&self, prefix: &str, job_id: &JobId) -> Result<reqwest::Url> {
        if job_id.as_str().trim().is_empty() {
            return Err(ClientError::InvalidRequest("empty job id".to_string()));
        }
        let mut url = reqwest::Url::parse(&format!("{}/{}", self.base_url, prefix))
            .map_err(|e| ClientError::InvalidRequest(format!("invalid console URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest("console URL cannot be a base".to_string()))?
            .push(job_id.as_str());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_url() {
        let client = ConsoleClient::new("http://localhost:5000/");
        let url = client
            .job_url("api/status", &JobId::from("baseline.yml_20240101_120000-10.0.0.5"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/status/baseline.yml_20240101_120000-10.0.0.5"
        );
    }

    #[test]
    fn test_status_url_encodes_id() {
        let client = ConsoleClient::new("http://localhost:5000");
        let url = client.job_url("api/status", &JobId::from("a b/c")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/status/a%20b%2Fc");
    }

    #[test]
    fn test_cancel_body_shape() {
        let req = CancelRequest {
            job_id: JobId::from("j-1"),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "job_id": "j-1" })
        );

        let res: CancelResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(res.success);
        assert!(res.error.is_none());
    }

    #[test]
    fn test_empty_job_id_rejected() {
        let client = ConsoleClient::new("http://localhost:5000");
        let err = client.job_url("api/status", &JobId::from("  ")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
