use crate::{error::RunError, payload::KEY_LEN};

/// Workload shape for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of parallel workers.
    pub threads: usize,
    /// Length of every generated document body.
    pub size: usize,
    /// Total transactions across all workers; `0` means run until cancelled.
    pub count: u64,
    /// Capacity of the results channel between workers and the aggregator.
    pub buffer: usize,
    /// Length of every generated document key.
    pub key_len: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            size: 10_000,
            count: 0,
            buffer: 4096,
            key_len: KEY_LEN,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), RunError> {
        if self.threads == 0 {
            return Err(RunError::Config("threads must be > 0".into()));
        }
        if self.buffer == 0 {
            return Err(RunError::Config("buffer must be > 0".into()));
        }
        if self.key_len == 0 {
            return Err(RunError::Config("key length must be > 0".into()));
        }
        Ok(())
    }

    /// `true` when workers loop until cancellation.
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_cli_defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.threads, 1);
        assert_eq!(cfg.size, 10_000);
        assert!(cfg.is_unlimited());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_threads_rejected() {
        let cfg = RunConfig {
            threads: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(RunError::Config(_))));
    }

    #[test]
    fn zero_buffer_rejected() {
        let cfg = RunConfig {
            buffer: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(RunError::Config(_))));
    }
}
