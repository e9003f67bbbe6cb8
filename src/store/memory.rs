use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::job::{Artifact, Job, JobId};
use crate::store::JobStore;

const DEFAULT_MAX_JOBS: usize = 10_000;

#[derive(Debug)]
struct JobTable {
    jobs: HashMap<JobId, Job>,
    artifacts: HashMap<JobId, Vec<Artifact>>,
    next_id: u64,
    max_jobs: usize,
}

/// In-process job store with sequential ids starting at 1.
#[derive(Debug)]
pub struct MemoryJobStore {
    table: RwLock<JobTable>,
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_JOBS)
    }

    pub fn with_capacity(max_jobs: usize) -> Self {
        Self::build(max_jobs, 1)
    }

    /// Start allocating ids from `next_id`. Useful when resuming numbering
    /// from another store.
    pub fn starting_at(next_id: u64) -> Self {
        Self::build(DEFAULT_MAX_JOBS, next_id)
    }

    fn build(max_jobs: usize, next_id: u64) -> Self {
        Self {
            table: RwLock::new(JobTable {
                jobs: HashMap::new(),
                artifacts: HashMap::new(),
                next_id,
                max_jobs,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.jobs.is_empty()
    }

    /// All jobs sorted chronologically by creation time.
    pub async fn all_jobs(&self) -> Vec<Job> {
        let table = self.table.read().await;
        let mut jobs: Vec<Job> = table.jobs.values().cloned().collect();
        jobs.sort_by_key(|j| (j.created_at, j.id));
        jobs
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(&self) -> Result<Job, StoreError> {
        let mut table = self.table.write().await;
        if table.jobs.len() >= table.max_jobs {
            return Err(StoreError::Full(table.max_jobs));
        }
        let id = JobId(table.next_id);
        table.next_id = table
            .next_id
            .checked_add(1)
            .ok_or(StoreError::Full(table.max_jobs))?;

        let job = Job::new(id);
        table.jobs.insert(id, job.clone());
        tracing::debug!(job_id = %id, "Job record created");
        Ok(job)
    }

    async fn get_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.table.read().await.jobs.get(&id).cloned())
    }

    async fn save_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        match table.jobs.get_mut(&job.id) {
            Some(stored) => {
                *stored = job.clone();
                Ok(())
            }
            None => Err(StoreError::JobNotFound(job.id)),
        }
    }

    async fn active_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let table = self.table.read().await;
        let mut jobs: Vec<Job> = table
            .jobs
            .values()
            .filter(|j| j.is_active())
            .cloned()
            .collect();
        jobs.sort_by_key(|j| (j.created_at, j.id));
        Ok(jobs)
    }

    async fn delete_artifacts(&self, id: JobId) -> Result<usize, StoreError> {
        let mut table = self.table.write().await;
        if !table.jobs.contains_key(&id) {
            return Err(StoreError::JobNotFound(id));
        }
        Ok(table.artifacts.remove(&id).map(|a| a.len()).unwrap_or(0))
    }

    async fn create_artifact(&self, id: JobId, artifact: Artifact) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        if !table.jobs.contains_key(&id) {
            return Err(StoreError::JobNotFound(id));
        }
        table.artifacts.entry(id).or_default().push(artifact);
        Ok(())
    }

    async fn artifacts(&self, id: JobId) -> Result<Vec<Artifact>, StoreError> {
        let table = self.table.read().await;
        if !table.jobs.contains_key(&id) {
            return Err(StoreError::JobNotFound(id));
        }
        Ok(table.artifacts.get(&id).cloned().unwrap_or_default())
    }
}
