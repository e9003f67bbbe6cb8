//! Background driver that polls every active job on an interval.
//!
//! Each pass lists the `Running` jobs from the store and polls them through
//! the [`JobController`], several at a time. A job is claimed for the whole
//! duration of its poll, so overlapping passes never poll the same job twice
//! at once. The record is re-read after the claim, which keeps a pass that
//! listed a job before another pass finished it from finalizing it again.
//!
//! A failed poll is logged and only affects that job.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::PollerConfig;
use crate::error::Result;
use crate::job::JobId;
use crate::lifecycle::JobController;

/// Counters for one polling pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub polled: usize,
    pub finished: usize,
    pub failed: usize,
    /// Jobs left alone because a poll for them was already in flight.
    pub skipped: usize,
}

type InFlight = Arc<Mutex<HashSet<JobId>>>;

/// Releases a job's claim when the poll task ends, panics included.
struct Claim {
    in_flight: InFlight,
    id: JobId,
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.id);
    }
}

pub struct Poller {
    controller: Arc<JobController>,
    config: PollerConfig,
    in_flight: InFlight,
    limit: Arc<Semaphore>,
}

impl Poller {
    pub fn new(controller: Arc<JobController>, config: PollerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            limit: Arc::new(Semaphore::new(config.max_concurrent_polls)),
            controller,
            config,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Whether a poll for `id` is currently running.
    pub fn is_in_flight(&self, id: JobId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    fn claim(&self, id: JobId) -> Option<Claim> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(id) {
            return None;
        }
        Some(Claim {
            in_flight: self.in_flight.clone(),
            id,
        })
    }

    /// Poll every active job once and wait for all polls to finish.
    ///
    /// Only listing the active jobs can fail; per-job failures are counted
    /// in the summary.
    pub async fn poll_once(&self) -> Result<PollSummary> {
        let jobs = self.controller.store().active_jobs().await?;
        let mut summary = PollSummary::default();
        let mut tasks = JoinSet::new();

        for job in jobs {
            let Some(claim) = self.claim(job.id) else {
                tracing::debug!(job_id = %job.id, "Poll already in flight, skipping");
                summary.skipped += 1;
                continue;
            };
            let controller = self.controller.clone();
            let limit = self.limit.clone();
            tasks.spawn(async move {
                let _claim = claim;
                // The semaphore is never closed.
                let _permit = limit.acquire_owned().await.ok();
                (job.id, controller.poll_by_id(job.id).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok((_, outcome)))) => {
                    summary.polled += 1;
                    if outcome.is_finished() {
                        summary.finished += 1;
                    }
                }
                Ok((id, Err(e))) => {
                    summary.polled += 1;
                    summary.failed += 1;
                    tracing::warn!(job_id = %id, error = %e, "Job poll failed");
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(error = %e, "Job poll task aborted");
                }
            }
        }

        Ok(summary)
    }

    /// Poll on every tick until `shutdown` is cancelled. A pass that has
    /// started is allowed to finish before the loop exits.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_millis(self.config.interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_ms = self.config.interval_ms,
            max_concurrent_polls = self.config.max_concurrent_polls,
            "Poller started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Poller shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(summary) if summary.polled > 0 || summary.skipped > 0 => {
                            tracing::debug!(
                                polled = summary.polled,
                                finished = summary.finished,
                                failed = summary.failed,
                                skipped = summary.skipped,
                                "Poll pass complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to list active jobs");
                        }
                    }
                }
            }
        }
    }
}
