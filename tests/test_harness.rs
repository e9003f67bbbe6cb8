//! Test harness for lifecycle and poller integration tests.
//!
//! Provides a scriptable in-memory scheduler, a ready-wired controller and
//! log capture.

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;

use vmck::config::ControllerConfig;
use vmck::lifecycle::JobController;
use vmck::scheduler::{JobDescription, SchedulerClient};
use vmck::store::{JobStore, MemoryJobStore};
use vmck::SchedulerError;

#[derive(Default)]
struct FakeState {
    /// Scripted status answers per handle. The last answer repeats.
    statuses: HashMap<String, VecDeque<Option<String>>>,
    files: HashMap<(String, String), Vec<u8>>,
    failing_reads: HashSet<(String, String)>,
    fail_submit: bool,
    fail_status: HashSet<String>,
    fail_kill: bool,
    status_delay: Option<Duration>,

    submissions: Vec<JobDescription>,
    kills: Vec<String>,
    reads: Vec<(String, String)>,
    status_calls: Vec<String>,
    active_status: HashMap<String, usize>,
    max_parallel_per_handle: usize,
    active_total: usize,
    max_parallel_total: usize,
}

/// Scheduler stand-in whose answers are set by the test.
#[derive(Default)]
pub struct FakeScheduler {
    state: Mutex<FakeState>,
}

#[allow(dead_code)]
impl FakeScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Answer every following status query for `handle` with `status`.
    pub fn set_status(&self, handle: &str, status: Option<&str>) {
        self.script_status(handle, &[status]);
    }

    /// Answer successive status queries in order; the last one repeats.
    pub fn script_status(&self, handle: &str, statuses: &[Option<&str>]) {
        let script = statuses.iter().map(|s| s.map(str::to_string)).collect();
        self.state().statuses.insert(handle.to_string(), script);
    }

    pub fn put_file(&self, handle: &str, path: &str, data: &[u8]) {
        self.state()
            .files
            .insert((handle.to_string(), path.to_string()), data.to_vec());
    }

    pub fn remove_file(&self, handle: &str, path: &str) {
        self.state()
            .files
            .remove(&(handle.to_string(), path.to_string()));
    }

    pub fn fail_reads_of(&self, handle: &str, path: &str) {
        self.state()
            .failing_reads
            .insert((handle.to_string(), path.to_string()));
    }

    pub fn clear_read_failures(&self) {
        self.state().failing_reads.clear();
    }

    pub fn fail_submits(&self, fail: bool) {
        self.state().fail_submit = fail;
    }

    pub fn fail_status_of(&self, handle: &str) {
        self.state().fail_status.insert(handle.to_string());
    }

    pub fn fail_kills(&self, fail: bool) {
        self.state().fail_kill = fail;
    }

    pub fn delay_status(&self, delay: Duration) {
        self.state().status_delay = Some(delay);
    }

    pub fn submissions(&self) -> Vec<JobDescription> {
        self.state().submissions.clone()
    }

    pub fn kills(&self) -> Vec<String> {
        self.state().kills.clone()
    }

    pub fn kill_count(&self, handle: &str) -> usize {
        self.state().kills.iter().filter(|h| *h == handle).count()
    }

    pub fn reads(&self) -> Vec<(String, String)> {
        self.state().reads.clone()
    }

    pub fn read_paths(&self, handle: &str) -> Vec<String> {
        self.state()
            .reads
            .iter()
            .filter(|(h, _)| h == handle)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn status_calls(&self, handle: &str) -> usize {
        self.state()
            .status_calls
            .iter()
            .filter(|h| *h == handle)
            .count()
    }

    pub fn max_parallel_per_handle(&self) -> usize {
        self.state().max_parallel_per_handle
    }

    pub fn max_parallel_total(&self) -> usize {
        self.state().max_parallel_total
    }
}

#[async_trait]
impl SchedulerClient for FakeScheduler {
    async fn submit(&self, job: &JobDescription) -> Result<(), SchedulerError> {
        let mut state = self.state();
        if state.fail_submit {
            return Err(SchedulerError::Transport("connection refused".to_string()));
        }
        state.submissions.push(job.clone());
        Ok(())
    }

    async fn status(&self, handle: &str) -> Result<Option<String>, SchedulerError> {
        let delay = {
            let mut state = self.state();
            state.status_calls.push(handle.to_string());
            let active = state.active_status.entry(handle.to_string()).or_default();
            *active += 1;
            let active = *active;
            state.max_parallel_per_handle = state.max_parallel_per_handle.max(active);
            state.active_total += 1;
            state.max_parallel_total = state.max_parallel_total.max(state.active_total);
            state.status_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        if let Some(active) = state.active_status.get_mut(handle) {
            *active -= 1;
        }
        state.active_total -= 1;

        if state.fail_status.contains(handle) {
            return Err(SchedulerError::Rejected {
                code: 500,
                message: "internal error".to_string(),
            });
        }
        let answer = match state.statuses.get_mut(handle) {
            Some(script) if script.len() > 1 => script.pop_front().flatten(),
            Some(script) => script.front().cloned().flatten(),
            None => None,
        };
        Ok(answer)
    }

    async fn read_file(
        &self,
        handle: &str,
        path: &str,
    ) -> Result<Option<Vec<u8>>, SchedulerError> {
        let mut state = self.state();
        let key = (handle.to_string(), path.to_string());
        state.reads.push(key.clone());
        if state.failing_reads.contains(&key) {
            return Err(SchedulerError::Transport(format!("read of {} timed out", path)));
        }
        Ok(state.files.get(&key).cloned())
    }

    async fn kill(&self, handle: &str) -> Result<(), SchedulerError> {
        let mut state = self.state();
        if state.fail_kill {
            return Err(SchedulerError::Transport("connection reset".to_string()));
        }
        state.kills.push(handle.to_string());
        Ok(())
    }
}

/// Controller wired to a fake scheduler and an in-memory store.
pub struct TestEnv {
    pub scheduler: Arc<FakeScheduler>,
    pub store: Arc<MemoryJobStore>,
    pub controller: Arc<JobController>,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_store(config, MemoryJobStore::new())
    }

    pub fn with_store(config: ControllerConfig, store: MemoryJobStore) -> Self {
        let scheduler = FakeScheduler::new();
        let store = Arc::new(store);
        let controller = Arc::new(JobController::new(
            config,
            scheduler.clone() as Arc<dyn SchedulerClient>,
            store.clone() as Arc<dyn JobStore>,
        )
        .unwrap());
        Self {
            scheduler,
            store,
            controller,
        }
    }

    pub fn handle_of(&self, id: u64) -> String {
        format!("{}{}", self.controller.config().id_prefix, id)
    }
}

/// Default test configuration: prefix `job-`, deployment `test`.
#[allow(dead_code)]
pub fn test_config() -> ControllerConfig {
    ControllerConfig::new("job-", "test")
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl LogCapture {
    /// Route this thread's events to the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[allow(dead_code)]
pub async fn wait_for<F, Fut>(
    condition: F,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < timeout_duration {
        if condition().await {
            return true;
        }
        tokio::time::sleep(poll_interval).await;
    }
    false
}
