//! Status source abstraction

use async_trait::async_trait;
use playtrack_core::JobId;
use playtrack_core::dto::status::StatusSnapshot;

use crate::ConsoleClient;
use crate::error::Result;

/// Anything that can report the current snapshot of a job
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusSnapshot>;
}

#[async_trait]
impl StatusSource for ConsoleClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusSnapshot> {
        self.get_status(job_id).await
    }
}
