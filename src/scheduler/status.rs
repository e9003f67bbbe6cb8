use std::str::FromStr;

use crate::error::VmckError;

/// Allocation status as reported by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

impl std::fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerStatus::Pending => write!(f, "pending"),
            SchedulerStatus::Running => write!(f, "running"),
            SchedulerStatus::Complete => write!(f, "complete"),
            SchedulerStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SchedulerStatus {
    type Err = VmckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SchedulerStatus::Pending),
            "running" => Ok(SchedulerStatus::Running),
            "complete" => Ok(SchedulerStatus::Complete),
            "failed" => Ok(SchedulerStatus::Failed),
            other => Err(VmckError::UnknownStatus(other.to_string())),
        }
    }
}
