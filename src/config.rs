use crate::error::{Result, VmckError};

pub const JOB_PREFIX_VAR: &str = "NOMAD_JOB_PREFIX";
pub const DEPLOYMENT_NAME_VAR: &str = "NOMAD_DEPLOYMENT_NAME";
pub const POLL_INTERVAL_VAR: &str = "VMCK_POLL_INTERVAL_MS";
pub const MAX_CONCURRENT_POLLS_VAR: &str = "VMCK_MAX_CONCURRENT_POLLS";

/// Settings the lifecycle controller needs to address scheduler jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Prepended to the job id to form the scheduler handle. Must stay the
    /// same for as long as any job submitted under it is still running.
    pub id_prefix: String,
    /// Cosmetic, only used in the submitted job's display name.
    pub deployment_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            id_prefix: "vmck-".to_string(),
            deployment_name: "vmck".to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn new(id_prefix: impl Into<String>, deployment_name: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            deployment_name: deployment_name.into(),
        }
    }

    /// Read `NOMAD_JOB_PREFIX` and `NOMAD_DEPLOYMENT_NAME`, keeping defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            id_prefix: lookup(JOB_PREFIX_VAR).unwrap_or(defaults.id_prefix),
            deployment_name: lookup(DEPLOYMENT_NAME_VAR).unwrap_or(defaults.deployment_name),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// The prefix ends up in scheduler job ids and request paths.
    pub fn validate(&self) -> Result<()> {
        if self
            .id_prefix
            .chars()
            .any(|c| c.is_whitespace() || c == '/')
        {
            return Err(VmckError::Config(format!(
                "job prefix {:?} must not contain whitespace or '/'",
                self.id_prefix
            )));
        }
        Ok(())
    }
}

/// Settings for the background poll driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval_ms: u64,
    /// Upper bound on jobs polled at the same time. Each job is still polled
    /// at most once at a time regardless of this value.
    pub max_concurrent_polls: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_concurrent_polls: 8,
        }
    }
}

impl PollerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let interval_ms = match lookup(POLL_INTERVAL_VAR) {
            Some(raw) => parse_number(POLL_INTERVAL_VAR, &raw)?,
            None => defaults.interval_ms,
        };
        let max_concurrent_polls = match lookup(MAX_CONCURRENT_POLLS_VAR) {
            Some(raw) => parse_number(MAX_CONCURRENT_POLLS_VAR, &raw)?,
            None => defaults.max_concurrent_polls,
        };
        let cfg = Self {
            interval_ms,
            max_concurrent_polls,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_max_concurrent_polls(mut self, max: usize) -> Self {
        self.max_concurrent_polls = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(VmckError::Config("poll interval must be positive".into()));
        }
        if self.max_concurrent_polls == 0 {
            return Err(VmckError::Config(
                "max concurrent polls must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| VmckError::Config(format!("{} is not a valid number: {:?}", key, raw)))
}
