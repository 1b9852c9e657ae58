//! The source contract

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use leakhound_core::domain::{Chunk, Connection, Progress, SourceType};
use leakhound_core::error::SourceError;

/// A configured backend that produces a stream of chunks.
///
/// Lifecycle: construct, `init` once with the connection payload, `chunks`
/// once to drive the backend, then drop. `progress` may be called from any
/// thread at any time.
#[async_trait]
pub trait Source: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Decode and validate the connection payload. Fails with a
    /// `ConfigError` when the payload is addressed to a different source
    /// type or required fields are absent or contradictory. A `concurrency`
    /// of zero means "use the host CPU count".
    async fn init(
        &mut self,
        name: &str,
        job_id: i64,
        source_id: i64,
        verify: bool,
        connection: Connection,
        concurrency: usize,
    ) -> Result<(), SourceError>;

    /// Drive the backend, pushing chunks into `sink` until the source is
    /// exhausted or `token` is cancelled; blocks until done. Transient
    /// per-item failures are logged and skipped; an unrecoverable backend
    /// failure returns a section-prefixed error. Cancellation is not an
    /// error.
    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError>;

    /// Snapshot of current progress.
    fn progress(&self) -> Progress;
}

/// Treat a requested concurrency of zero as "default to the CPU count".
pub fn normalized_concurrency(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_concurrency_defaults_to_cpu_count() {
        assert_eq!(normalized_concurrency(0), num_cpus::get().max(1));
        assert_eq!(normalized_concurrency(7), 7);
    }
}
