//! Persistence boundary for job records and their artifacts.
//!
//! The controller reads and writes through [`JobStore`]; how records are kept
//! is up to the implementation. [`MemoryJobStore`] keeps everything in process.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::{Artifact, Job, JobId};

pub use memory::MemoryJobStore;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Allocate a new record with a fresh id in the `Queued` state.
    async fn create_job(&self) -> Result<Job, StoreError>;

    async fn get_job(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// Persist the record's state. The job must already exist.
    async fn save_job(&self, job: &Job) -> Result<(), StoreError>;

    /// Jobs that still need polling, oldest first: those in the `Running`
    /// state and `Done` jobs that still owe a kill.
    async fn active_jobs(&self) -> Result<Vec<Job>, StoreError>;

    /// Remove every artifact of the job. Returns how many were removed.
    async fn delete_artifacts(&self, id: JobId) -> Result<usize, StoreError>;

    async fn create_artifact(&self, id: JobId, artifact: Artifact) -> Result<(), StoreError>;

    async fn artifacts(&self, id: JobId) -> Result<Vec<Artifact>, StoreError>;
}
