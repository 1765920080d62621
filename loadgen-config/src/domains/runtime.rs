//! Tokio runtime configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};

/// Runtime sizing.
///
/// Workloads run on the blocking pool, so `max_blocking_threads` caps how many
/// execute at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Async worker threads (`None` uses one per core)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,

    /// Upper bound on the blocking thread pool
    #[serde(default = "default_max_blocking_threads")]
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_blocking_threads: default_max_blocking_threads(),
        }
    }
}

impl Validatable for RuntimeConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(workers) = self.worker_threads {
            validate_positive(workers, "worker_threads", self.domain_name())?;
        }
        validate_positive(self.max_blocking_threads, "max_blocking_threads", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "runtime"
    }
}

fn default_max_blocking_threads() -> usize {
    512
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_validation() {
        assert!(RuntimeConfig::default().validate().is_ok());

        let config = RuntimeConfig {
            worker_threads: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RuntimeConfig {
            max_blocking_threads: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
