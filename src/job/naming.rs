//! Names and paths derived from a job's identity.
//!
//! The scheduler handle is never stored. It is recomputed from the configured
//! prefix and the job id on every call, so the prefix must not change while
//! jobs submitted under it are still in flight.

use super::JobId;

/// Directory inside the allocation where the payload writes its outputs.
pub const DATA_DIR: &str = "alloc/data";

/// Directory inside the allocation where the scheduler keeps task logs.
pub const LOG_DIR: &str = "alloc/logs";

/// Marker file whose presence means the payload has finished.
pub const SENTINEL_FILE: &str = "done";

pub fn scheduler_handle(prefix: &str, id: JobId) -> String {
    format!("{}{}", prefix, id)
}

/// Human-readable job name shown in the scheduler UI.
pub fn display_name(deployment_name: &str, id: JobId) -> String {
    format!("{} job #{}", deployment_name, id)
}

pub fn data_path(name: &str) -> String {
    format!("{}/{}", DATA_DIR, name)
}

pub fn sentinel_path() -> String {
    data_path(SENTINEL_FILE)
}

/// Path of the first rotated log file for one task stream.
pub fn log_path(process: &str, stream: &str) -> String {
    format!("{}/{}.{}.0", LOG_DIR, process, stream)
}
