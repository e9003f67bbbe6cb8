//! Job lifecycle control: submission, completion detection and the
//! post-completion collection of artifacts and logs.
//!
//! # State machine
//!
//! ```text
//! Queued --create--> Running --poll--> Done
//! ```
//!
//! `poll` moves a job to `Done` when the scheduler reports `complete` or
//! `failed`, or when it still reports `running` but the payload has written
//! the sentinel file. In the sentinel case the scheduler job is killed after
//! finalization because the scheduler would otherwise keep it alive. The
//! `Done` record is saved with `kill_pending` set and cleared once the kill
//! succeeds, so a failed kill is re-sent by the next poll.
//!
//! # Finalization
//!
//! 1. [`logs::dump_logs`] reads the task logs (best effort)
//! 2. [`artifacts::sync_artifacts`] replaces the stored artifacts
//! 3. the record is marked `Done` and saved
//!
//! A job can only reach `Done` through `Running`.
//!
//! # Concurrency
//!
//! The controller holds no locks. Callers must not poll the same job from
//! two tasks at once; [`crate::poller::Poller`] guarantees this.

pub mod artifacts;
pub mod controller;
pub mod logs;

pub use artifacts::{sync_artifacts, ARTIFACT_NAMES};
pub use controller::{JobController, PollOutcome};
pub use logs::{dump_logs, CapturedLog, LogContents, LOG_PROCESSES, LOG_STREAMS};
