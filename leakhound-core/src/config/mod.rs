//! Scanner configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the base directory for temporary clones.
pub const TMPDIR_ENV: &str = "LEAKHOUND_TMPDIR";

/// Top-level scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Number of detector workers. `0` means "use the host CPU count".
    pub concurrency: usize,
    /// Capacity of the bounded chunk channel between source and workers.
    pub chunk_buffer: usize,
    /// Per-request timeout for live credential verification (in seconds).
    pub verification_timeout_seconds: u64,
    /// Base directory for temporary repository clones. `None` falls back to
    /// the `LEAKHOUND_TMPDIR` environment variable, then the OS temp dir.
    pub clone_base: Option<PathBuf>,
    pub retry: RetryConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            chunk_buffer: 64,
            verification_timeout_seconds: 10,
            clone_base: None,
            retry: RetryConfig::default(),
        }
    }
}

impl ScannerConfig {
    /// Resolve the clone base directory: explicit config, then environment,
    /// then the OS temp dir.
    pub fn clone_base(&self) -> PathBuf {
        if let Some(base) = &self.clone_base {
            return base.clone();
        }
        if let Ok(dir) = std::env::var(TMPDIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        std::env::temp_dir()
    }

    pub fn verification_timeout(&self) -> Duration {
        Duration::from_secs(self.verification_timeout_seconds)
    }
}

/// Retry policy for outbound HTTP requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the given retry attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis((self.initial_delay_ms as f64 * factor) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ScannerConfig::default();
        assert_eq!(config.concurrency, 0);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.verification_timeout() >= Duration::from_secs(1));
    }

    #[test]
    fn backoff_grows_exponentially() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(retry.delay_for_attempt(2), Duration::from_millis(1000));
        assert_eq!(retry.delay_for_attempt(3), Duration::from_millis(2000));
    }

    #[test]
    fn explicit_clone_base_wins() {
        let config = ScannerConfig {
            clone_base: Some(PathBuf::from("/scratch/clones")),
            ..Default::default()
        };
        assert_eq!(config.clone_base(), PathBuf::from("/scratch/clones"));
    }
}
