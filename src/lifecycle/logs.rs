use crate::job::naming::log_path;
use crate::job::JobId;
use crate::scheduler::SchedulerClient;

/// Tasks whose logs are captured.
pub const LOG_PROCESSES: [&str; 2] = ["control", "vm"];
pub const LOG_STREAMS: [&str; 2] = ["stdout", "stderr"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogContents {
    Present(String),
    /// Missing or zero-length.
    Empty,
    /// The read failed; holds the error message.
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLog {
    pub path: String,
    pub contents: LogContents,
}

/// Emit the job's task logs as debug events.
///
/// Never fails: missing logs are routine and read errors are logged as
/// warnings. Nothing is persisted.
pub async fn dump_logs(
    scheduler: &dyn SchedulerClient,
    job_id: JobId,
    handle: &str,
) -> Vec<CapturedLog> {
    let mut captured = Vec::with_capacity(LOG_PROCESSES.len() * LOG_STREAMS.len());
    for process in LOG_PROCESSES {
        for stream in LOG_STREAMS {
            let path = log_path(process, stream);
            let contents = match scheduler.read_text(handle, &path).await {
                Ok(Some(text)) if !text.is_empty() => {
                    tracing::debug!(job_id = %job_id, path = %path, "=== {} ===\n{}", path, text);
                    LogContents::Present(text)
                }
                Ok(_) => {
                    tracing::debug!(job_id = %job_id, path = %path, "{} is empty", path);
                    LogContents::Empty
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %job_id,
                        path = %path,
                        error = %e,
                        "Failed to read job log"
                    );
                    LogContents::Unreadable(e.to_string())
                }
            };
            captured.push(CapturedLog { path, contents });
        }
    }
    captured
}
