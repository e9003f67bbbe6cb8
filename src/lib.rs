pub mod config;
pub mod error;
pub mod job;
pub mod lifecycle;
pub mod poller;
pub mod scheduler;
pub mod store;

pub use error::{Result, SchedulerError, StoreError, VmckError};
pub use job::{Artifact, Job, JobId, JobState};
pub use lifecycle::{JobController, PollOutcome};
pub use poller::{PollSummary, Poller};
