pub mod artifact;
pub mod naming;
pub mod record;

pub use artifact::Artifact;
pub use naming::{display_name, scheduler_handle};
pub use record::{Job, JobId, JobState};
