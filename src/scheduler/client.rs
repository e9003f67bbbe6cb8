use async_trait::async_trait;

use crate::error::SchedulerError;
use crate::scheduler::JobDescription;

#[async_trait]
pub trait SchedulerClient: Send + Sync {
    /// Register a job with the scheduler.
    async fn submit(&self, job: &JobDescription) -> Result<(), SchedulerError>;

    /// Raw status string of the job's allocation, or `None` if there is
    /// nothing to report yet.
    async fn status(&self, handle: &str) -> Result<Option<String>, SchedulerError>;

    /// Read a file from the job's allocation as raw bytes.
    async fn read_file(&self, handle: &str, path: &str)
        -> Result<Option<Vec<u8>>, SchedulerError>;

    /// Read a file from the job's allocation as text.
    async fn read_text(&self, handle: &str, path: &str) -> Result<Option<String>, SchedulerError> {
        Ok(self
            .read_file(handle, path)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Ask the scheduler to stop the job. Stopping a job that already
    /// finished must succeed.
    async fn kill(&self, handle: &str) -> Result<(), SchedulerError>;
}
