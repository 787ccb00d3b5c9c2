//! Cancellation DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// Body of `POST /api/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub job_id: JobId,
}

/// Response of `POST /api/cancel`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
