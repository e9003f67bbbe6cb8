use thiserror::Error;

use crate::job::JobId;

/// Failure reported by a scheduler client.
///
/// A missing file or an unknown job is not a failure: clients return `Ok(None)`
/// for those. This type is reserved for requests that could not be answered.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Scheduler rejected request ({code}): {message}")]
    Rejected { code: u16, message: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Job store at capacity ({0} jobs)")]
    Full(usize),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum VmckError {
    #[error("Unknown scheduler status {0:?}")]
    UnknownStatus(String),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Invalid state transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: crate::job::JobState,
        to: crate::job::JobState,
    },

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VmckError>;
