use crate::error::Result;
use crate::job::naming::data_path;
use crate::job::{Artifact, JobId};
use crate::scheduler::SchedulerClient;
use crate::store::JobStore;

/// Files collected from `alloc/data/` once a job finishes.
pub const ARTIFACT_NAMES: [&str; 2] = ["stdout.txt", "stderr.txt"];

/// Replace the job's artifacts with the output files present right now.
///
/// Existing artifacts are always deleted first, even when no file is found.
/// A file that was never produced is skipped; a failed read aborts the sync.
pub async fn sync_artifacts(
    scheduler: &dyn SchedulerClient,
    store: &dyn JobStore,
    job_id: JobId,
    handle: &str,
) -> Result<Vec<Artifact>> {
    let removed = store.delete_artifacts(job_id).await?;
    if removed > 0 {
        tracing::debug!(job_id = %job_id, removed, "Cleared previous artifacts");
    }

    let mut synced = Vec::new();
    for name in ARTIFACT_NAMES {
        let Some(data) = scheduler.read_file(handle, &data_path(name)).await? else {
            tracing::debug!(job_id = %job_id, name, "Artifact not produced");
            continue;
        };
        let artifact = Artifact::new(name, data);
        tracing::debug!(job_id = %job_id, name, bytes = artifact.len(), "Artifact stored");
        store.create_artifact(job_id, artifact.clone()).await?;
        synced.push(artifact);
    }
    Ok(synced)
}
