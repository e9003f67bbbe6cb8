//! Contract with the cluster scheduler.
//!
//! The lifecycle controller never talks to Nomad directly; it goes through a
//! [`SchedulerClient`]. Implementations own transport, retries and
//! authentication. The controller only relies on the answers:
//!
//! - `Ok(None)` from [`SchedulerClient::status`] means the scheduler does not
//!   know the job yet
//! - `Ok(None)` from the file reads means the file was never produced
//! - `Err(_)` always means the question could not be answered
//!
//! Status strings are passed through raw and parsed by the controller into
//! [`SchedulerStatus`], so an unexpected value is caught in one place.

pub mod client;
pub mod description;
pub mod status;

pub use client::SchedulerClient;
pub use description::{JobDescription, TaskGroup};
pub use status::SchedulerStatus;
