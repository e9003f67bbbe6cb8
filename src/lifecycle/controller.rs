use std::sync::Arc;

use tracing::{Instrument, Span};

use crate::config::ControllerConfig;
use crate::error::{Result, VmckError};
use crate::job::naming::{display_name, scheduler_handle, sentinel_path};
use crate::job::{Job, JobId};
use crate::lifecycle::{artifacts, logs};
use crate::scheduler::{JobDescription, SchedulerClient, SchedulerStatus, TaskGroup};
use crate::store::JobStore;

/// What a single [`JobController::poll`] call observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The scheduler has nothing to report yet, or the job is pending.
    NotStarted,
    /// Still running and no sentinel file yet.
    Running,
    /// The job was finalized during this poll. `killed` is set when the
    /// scheduler job had to be stopped explicitly.
    Finished { killed: bool },
    /// The record was already `Done`, but a kill from an earlier poll had
    /// failed. The kill was sent again and succeeded.
    KillRetried,
    /// The record was already `Done`; nothing was asked of the scheduler.
    AlreadyDone,
}

impl PollOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, PollOutcome::Finished { .. })
    }
}

/// Drives job records through their lifecycle against a scheduler.
pub struct JobController {
    config: ControllerConfig,
    scheduler: Arc<dyn SchedulerClient>,
    store: Arc<dyn JobStore>,
    span: Span,
}

impl JobController {
    pub fn new(
        config: ControllerConfig,
        scheduler: Arc<dyn SchedulerClient>,
        store: Arc<dyn JobStore>,
    ) -> Result<Self> {
        config.validate()?;
        let span = tracing::info_span!("job_controller", deployment = %config.deployment_name);
        Ok(Self {
            config,
            scheduler,
            store,
            span,
        })
    }

    /// Emit all events under `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Scheduler-side identifier of `job`.
    pub fn handle(&self, job: &Job) -> String {
        scheduler_handle(&self.config.id_prefix, job.id)
    }

    /// Allocate a job record and submit it to the scheduler.
    ///
    /// The record is only marked `Running` after the scheduler accepted it.
    /// If submission fails the error is returned and the record stays queued.
    pub async fn create(&self, task_groups: Vec<TaskGroup>) -> Result<Job> {
        self.create_inner(task_groups)
            .instrument(self.span.clone())
            .await
    }

    async fn create_inner(&self, task_groups: Vec<TaskGroup>) -> Result<Job> {
        let mut job = self.store.create_job().await?;
        let handle = self.handle(&job);
        let description = JobDescription::new(
            handle.clone(),
            display_name(&self.config.deployment_name, job.id),
            task_groups,
        );

        if let Err(e) = self.scheduler.submit(&description).await {
            tracing::warn!(job_id = %job.id, handle = %handle, error = %e, "Job submission failed");
            return Err(e.into());
        }

        job.mark_running()?;
        self.store.save_job(&job).await?;
        tracing::info!(
            job_id = %job.id,
            handle = %handle,
            name = %description.name,
            "Job submitted"
        );
        Ok(job)
    }

    /// Check the job's scheduler status and advance it.
    ///
    /// | status                | action                                 |
    /// |-----------------------|----------------------------------------|
    /// | none / `pending`      | nothing                                |
    /// | `running`             | finalize and kill if the sentinel exists |
    /// | `complete` / `failed` | finalize                               |
    /// | anything else         | [`VmckError::UnknownStatus`]            |
    ///
    /// A `Done` job that still owes a kill gets the kill re-sent and nothing
    /// else. The job must not be polled concurrently from another task.
    pub async fn poll(&self, job: &mut Job) -> Result<PollOutcome> {
        let span = self.span.clone();
        self.poll_inner(job).instrument(span).await
    }

    async fn poll_inner(&self, job: &mut Job) -> Result<PollOutcome> {
        if job.state.is_terminal() {
            if job.kill_pending {
                let handle = self.handle(job);
                self.kill_owed(job, &handle).await?;
                return Ok(PollOutcome::KillRetried);
            }
            tracing::debug!(job_id = %job.id, "Job already done, skipping poll");
            return Ok(PollOutcome::AlreadyDone);
        }

        let handle = self.handle(job);
        let raw = self.scheduler.status(&handle).await?;
        tracing::debug!(job_id = %job.id, handle = %handle, status = ?raw, "Job status");

        let status = match raw.as_deref() {
            None => return Ok(PollOutcome::NotStarted),
            Some(s) => s.parse::<SchedulerStatus>()?,
        };

        match status {
            SchedulerStatus::Pending => Ok(PollOutcome::NotStarted),
            SchedulerStatus::Running => {
                let changed = job.mark_running()?;
                let sentinel = self.scheduler.read_file(&handle, &sentinel_path()).await?;
                if sentinel.is_some() {
                    tracing::info!(
                        job_id = %job.id,
                        handle = %handle,
                        "Sentinel found while running"
                    );
                    self.finalize(job, &handle, true).await?;
                    self.kill_owed(job, &handle).await?;
                    return Ok(PollOutcome::Finished { killed: true });
                }
                if changed {
                    self.store.save_job(job).await?;
                }
                Ok(PollOutcome::Running)
            }
            SchedulerStatus::Complete | SchedulerStatus::Failed => {
                self.finalize(job, &handle, false).await?;
                Ok(PollOutcome::Finished { killed: false })
            }
        }
    }

    /// Load the current record for `id`, poll it, and return the updated
    /// record along with what happened.
    pub async fn poll_by_id(&self, id: JobId) -> Result<(Job, PollOutcome)> {
        let mut job = self
            .store
            .get_job(id)
            .await?
            .ok_or(VmckError::JobNotFound(id))?;
        let outcome = self.poll(&mut job).await?;
        Ok((job, outcome))
    }

    /// Logs first, then artifacts, then `Done`. `Done` promises the
    /// artifacts are in place, so a failed sync leaves the job running and
    /// the next poll tries again.
    ///
    /// With `kill_after`, the saved `Done` record also owes a kill, so a
    /// kill that fails afterwards is retried by later polls.
    async fn finalize(&self, job: &mut Job, handle: &str, kill_after: bool) -> Result<()> {
        logs::dump_logs(self.scheduler.as_ref(), job.id, handle).await;
        let synced =
            artifacts::sync_artifacts(self.scheduler.as_ref(), self.store.as_ref(), job.id, handle)
                .await?;

        job.mark_running()?;
        job.mark_done()?;
        job.kill_pending = kill_after;
        self.store.save_job(job).await?;
        tracing::info!(
            job_id = %job.id,
            handle = %handle,
            artifacts = synced.len(),
            "Job finished"
        );
        Ok(())
    }

    /// Ask the scheduler to stop the job. The record is left untouched.
    pub async fn kill(&self, job: &Job) -> Result<()> {
        let handle = self.handle(job);
        self.kill_handle(job.id, &handle)
            .instrument(self.span.clone())
            .await
    }

    /// Send the kill a finalized job owes and clear the debt once it lands.
    async fn kill_owed(&self, job: &mut Job, handle: &str) -> Result<()> {
        if let Err(e) = self.kill_handle(job.id, handle).await {
            tracing::warn!(
                job_id = %job.id,
                handle = %handle,
                error = %e,
                "Kill failed, will retry"
            );
            return Err(e);
        }
        job.kill_pending = false;
        self.store.save_job(job).await?;
        Ok(())
    }

    async fn kill_handle(&self, id: JobId, handle: &str) -> Result<()> {
        self.scheduler.kill(handle).await?;
        tracing::info!(job_id = %id, handle = %handle, "Job killed");
        Ok(())
    }
}
