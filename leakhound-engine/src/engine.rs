//! The scan engine

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use leakhound_core::domain::{Chunk, ChunkMetadata, SourceType};
use leakhound_core::error::SourceError;
use leakhound_core::infrastructure::rate::RateCounter;
use leakhound_detectors::{Detector, DetectorRegistry, DetectorResult};
use leakhound_sources::{normalized_concurrency, Source};

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Detector workers. Zero means the host CPU count.
    pub concurrency: usize,
    /// Capacity of the bounded chunk channel between source and workers.
    pub chunk_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            chunk_buffer: 64,
        }
    }
}

/// A detector result stitched to the provenance of the chunk it came from.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub source_name: String,
    pub source_id: i64,
    pub job_id: i64,
    pub source_type: SourceType,
    pub metadata: ChunkMetadata,
    #[serde(flatten)]
    pub result: DetectorResult,
}

/// A running scan: the finding stream plus the source's terminal result.
pub struct ScanHandle {
    /// Closes once the source has finished and every worker has drained.
    pub findings: mpsc::Receiver<Finding>,
    /// Resolves to the source's own outcome (fatal backend errors, config
    /// problems); cancellation resolves it to `Ok`.
    pub source: JoinHandle<Result<(), SourceError>>,
}

/// Composes a single source with the detector registry.
pub struct ScanEngine {
    registry: Arc<DetectorRegistry>,
    config: EngineConfig,
    rate: Arc<RateCounter>,
}

impl ScanEngine {
    pub fn new(registry: DetectorRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            rate: Arc::new(RateCounter::new()),
        }
    }

    /// Verification passes per second since the last sample, for operator
    /// visibility. There is no hard ceiling.
    pub fn verification_rate(&self) -> f64 {
        self.rate.per_second()
    }

    pub fn verifications_total(&self) -> u64 {
        self.rate.total()
    }

    /// Start scanning an initialized source. The source runs on its own
    /// task; `concurrency` workers share the chunk channel. All results
    /// fully formed before cancellation are still delivered.
    pub fn scan(&self, source: Arc<dyn Source>, token: CancellationToken) -> ScanHandle {
        let workers = normalized_concurrency(self.config.concurrency);
        let (chunk_tx, chunk_rx) = mpsc::channel::<Chunk>(self.config.chunk_buffer);
        let (finding_tx, finding_rx) = mpsc::channel::<Finding>(self.config.chunk_buffer);

        info!(
            workers,
            detectors = self.registry.len(),
            source = %source.source_type(),
            "starting scan"
        );

        let source_token = token.clone();
        let source_handle =
            tokio::spawn(async move { source.chunks(source_token, chunk_tx).await });

        let shared_rx = Arc::new(Mutex::new(chunk_rx));
        for worker_id in 0..workers {
            let worker = DetectorWorker {
                id: worker_id,
                registry: Arc::clone(&self.registry),
                rate: Arc::clone(&self.rate),
                token: token.clone(),
                findings: finding_tx.clone(),
            };
            let rx = Arc::clone(&shared_rx);
            tokio::spawn(async move { worker.run(rx).await });
        }
        // Workers hold the only sender clones; the finding channel closes
        // when the last worker exits.
        drop(finding_tx);

        ScanHandle {
            findings: finding_rx,
            source: source_handle,
        }
    }
}

struct DetectorWorker {
    id: usize,
    registry: Arc<DetectorRegistry>,
    rate: Arc<RateCounter>,
    token: CancellationToken,
    findings: mpsc::Sender<Finding>,
}

impl DetectorWorker {
    async fn run(&self, chunks: Arc<Mutex<mpsc::Receiver<Chunk>>>) {
        loop {
            let chunk = {
                let mut rx = chunks.lock().await;
                tokio::select! {
                    _ = self.token.cancelled() => None,
                    chunk = rx.recv() => chunk,
                }
            };
            let Some(chunk) = chunk else {
                debug!(worker = self.id, "worker draining");
                return;
            };

            if !self.process_chunk(chunk).await {
                return;
            }
        }
    }

    /// Returns false when the scan is shutting down.
    async fn process_chunk(&self, chunk: Chunk) -> bool {
        // Byte-fold once; every detector's keyword check reuses it.
        let lowered = chunk.data.to_ascii_lowercase();

        for detector in self.registry.detectors() {
            if self.token.is_cancelled() {
                return false;
            }
            if !contains_any_keyword(&lowered, detector.keywords()) {
                continue;
            }

            if chunk.verify {
                self.rate.tick();
            }

            // Dropping the future here aborts any in-flight verification
            // read along with it.
            let outcome = tokio::select! {
                _ = self.token.cancelled() => return false,
                outcome = detector.from_data(chunk.verify, &chunk.data) => outcome,
            };

            let results = match outcome {
                Ok(results) => results,
                Err(err) => {
                    debug!(
                        worker = self.id,
                        detector = %detector.detector_type(),
                        error = %err,
                        "detector failed on chunk"
                    );
                    continue;
                }
            };

            for result in results {
                let finding = Finding {
                    source_name: chunk.source_name.clone(),
                    source_id: chunk.source_id,
                    job_id: chunk.job_id,
                    source_type: chunk.source_type,
                    metadata: chunk.metadata.clone(),
                    result,
                };
                tokio::select! {
                    _ = self.token.cancelled() => return false,
                    sent = self.findings.send(finding) => {
                        if sent.is_err() {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }
}

/// Substring check over byte-folded chunk data. The pre-filter that decides
/// whether a detector's regexes run at all.
pub fn contains_any_keyword(lowered: &[u8], keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        let kw = kw.as_bytes();
        !kw.is_empty() && lowered.windows(kw.len()).any(|window| window == kw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_search_is_a_plain_substring_check() {
        let lowered = b"the quick jdbc:mysql string".to_vec();
        assert!(contains_any_keyword(&lowered, &["jdbc"]));
        assert!(contains_any_keyword(&lowered, &["missing", "quick"]));
        assert!(!contains_any_keyword(&lowered, &["postgres"]));
        assert!(!contains_any_keyword(&lowered, &[]));
    }

    #[test]
    fn keyword_longer_than_data_never_matches() {
        assert!(!contains_any_keyword(b"ab", &["abcdef"]));
    }
}
