use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VmckError};

/// Store-assigned job identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle state of a job record. Variants are ordered; a job only ever
/// moves forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Record allocated, not yet submitted to the scheduler.
    Queued,
    Running,
    Done,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "queued"),
            JobState::Running => write!(f, "running"),
            JobState::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set when the job finished on the sentinel path but the scheduler job
    /// has not been stopped yet. Cleared once a kill succeeds.
    #[serde(default)]
    pub kill_pending: bool,
}

impl Job {
    pub fn new(id: JobId) -> Self {
        Self::with_created_at(id, Utc::now())
    }

    pub fn with_created_at(id: JobId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            state: JobState::Queued,
            created_at,
            completed_at: None,
            kill_pending: false,
        }
    }

    /// Move the job to `to`. Returns whether the state changed.
    ///
    /// Staying in the current state is allowed; moving backwards or
    /// skipping `Running` is not.
    pub fn advance(&mut self, to: JobState) -> Result<bool> {
        let skips_running = self.state == JobState::Queued && to == JobState::Done;
        if to < self.state || skips_running {
            return Err(VmckError::InvalidTransition {
                id: self.id,
                from: self.state,
                to,
            });
        }
        if to == self.state {
            return Ok(false);
        }
        self.state = to;
        if to == JobState::Done {
            self.completed_at = Some(Utc::now());
        }
        Ok(true)
    }

    pub fn mark_running(&mut self) -> Result<bool> {
        self.advance(JobState::Running)
    }

    /// Flip the job to `Done`. Finishing twice is an error: `Done` is reached
    /// exactly once per job.
    pub fn mark_done(&mut self) -> Result<()> {
        if self.state == JobState::Done {
            return Err(VmckError::InvalidTransition {
                id: self.id,
                from: self.state,
                to: JobState::Done,
            });
        }
        self.advance(JobState::Done).map(|_| ())
    }

    /// Whether the job still needs polling: it is running, or it finished
    /// but its scheduler job is still owed a kill.
    pub fn is_active(&self) -> bool {
        self.state == JobState::Running || self.kill_pending
    }
}
