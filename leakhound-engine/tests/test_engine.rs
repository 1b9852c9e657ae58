//! Pipeline behavior with scripted sources and detectors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use leakhound_core::domain::{
    Chunk, ChunkMetadata, Connection, Progress, SourceType,
};
use leakhound_core::error::SourceError;
use leakhound_detectors::{
    Detector, DetectorError, DetectorRegistry, DetectorResult, DetectorType,
};
use leakhound_engine::{EngineConfig, ScanEngine};
use leakhound_sources::Source;

fn chunk(data: &str) -> Chunk {
    Chunk::new(
        "scripted",
        3,
        9,
        data.as_bytes().to_vec(),
        ChunkMetadata::Filesystem {
            file: "/tmp/scripted.txt".into(),
        },
        false,
    )
}

/// Source that replays a fixed chunk list.
struct StaticSource {
    chunks: Vec<Chunk>,
}

#[async_trait]
impl Source for StaticSource {
    fn source_type(&self) -> SourceType {
        SourceType::Filesystem
    }

    async fn init(
        &mut self,
        _name: &str,
        _job_id: i64,
        _source_id: i64,
        _verify: bool,
        _connection: Connection,
        _concurrency: usize,
    ) -> Result<(), SourceError> {
        Ok(())
    }

    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        for chunk in &self.chunks {
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                sent = sink.send(chunk.clone()) => {
                    if sent.is_err() {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    fn progress(&self) -> Progress {
        Progress::default()
    }
}

/// Source that never runs dry; only cancellation stops it.
struct EndlessSource;

#[async_trait]
impl Source for EndlessSource {
    fn source_type(&self) -> SourceType {
        SourceType::Filesystem
    }

    async fn init(
        &mut self,
        _name: &str,
        _job_id: i64,
        _source_id: i64,
        _verify: bool,
        _connection: Connection,
        _concurrency: usize,
    ) -> Result<(), SourceError> {
        Ok(())
    }

    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        loop {
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                sent = sink.send(chunk("fakekey-deadbeefcafe")) => {
                    if sent.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn progress(&self) -> Progress {
        Progress::default()
    }
}

/// Detector that counts how often the engine actually invokes it.
struct CountingDetector {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Detector for CountingDetector {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Stripe
    }

    fn keywords(&self) -> &[&'static str] {
        &["fakekey"]
    }

    async fn from_data(
        &self,
        _verify: bool,
        data: &[u8],
    ) -> Result<Vec<DetectorResult>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = String::from_utf8_lossy(data);
        Ok(text
            .split_whitespace()
            .filter(|word| word.starts_with("fakekey-"))
            .map(|word| DetectorResult::new(DetectorType::Stripe, word.as_bytes()))
            .collect())
    }
}

fn engine_with(calls: &Arc<AtomicUsize>, concurrency: usize) -> ScanEngine {
    let registry = DetectorRegistry::from_detectors(vec![Arc::new(CountingDetector {
        calls: Arc::clone(calls),
    })]);
    ScanEngine::new(
        registry,
        EngineConfig {
            concurrency,
            chunk_buffer: 8,
        },
    )
}

#[tokio::test]
async fn findings_carry_the_chunk_provenance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_with(&calls, 2);
    let source = Arc::new(StaticSource {
        chunks: vec![chunk("context fakekey-deadbeefcafe context")],
    });

    let mut handle = engine.scan(source, CancellationToken::new());

    let mut findings = Vec::new();
    while let Some(finding) = handle.findings.recv().await {
        findings.push(finding);
    }
    handle.source.await.unwrap().unwrap();

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.source_name, "scripted");
    assert_eq!(finding.source_id, 3);
    assert_eq!(finding.job_id, 9);
    assert_eq!(finding.source_type, SourceType::Filesystem);
    assert_eq!(finding.result.raw, b"fakekey-deadbeefcafe".to_vec());
    assert!(matches!(
        &finding.metadata,
        ChunkMetadata::Filesystem { file } if file == "/tmp/scripted.txt"
    ));
}

#[tokio::test]
async fn prefilter_skips_detectors_without_keyword_hits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_with(&calls, 2);
    let source = Arc::new(StaticSource {
        chunks: vec![
            chunk("nothing to see in this chunk"),
            chunk("another quiet chunk"),
        ],
    });

    let mut handle = engine.scan(source, CancellationToken::new());
    while handle.findings.recv().await.is_some() {}
    handle.source.await.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn keyword_check_is_case_insensitive() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_with(&calls, 1);
    // Uppercase trigger, lowercase keyword: the byte-fold finds it; the
    // detector itself then sees the original bytes.
    let source = Arc::new(StaticSource {
        chunks: vec![chunk("FAKEKEY marker but no token")],
    });

    let mut handle = engine.scan(source, CancellationToken::new());
    while handle.findings.recv().await.is_some() {}
    handle.source.await.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_chunk_is_processed_across_workers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_with(&calls, 4);
    let chunks: Vec<Chunk> = (0..50)
        .map(|i| chunk(&format!("entry {i}: fakekey-token{i:04}")))
        .collect();
    let source = Arc::new(StaticSource { chunks });

    let mut handle = engine.scan(source, CancellationToken::new());
    let mut findings = Vec::new();
    while let Some(finding) = handle.findings.recv().await {
        findings.push(finding);
    }
    handle.source.await.unwrap().unwrap();

    assert_eq!(findings.len(), 50);
    let mut raws: Vec<String> = findings
        .iter()
        .map(|f| String::from_utf8_lossy(&f.result.raw).into_owned())
        .collect();
    raws.sort();
    raws.dedup();
    assert_eq!(raws.len(), 50);
}

#[tokio::test]
async fn cancellation_drains_and_closes_the_pipeline() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = engine_with(&calls, 2);
    let token = CancellationToken::new();

    let mut handle = engine.scan(Arc::new(EndlessSource), token.clone());

    // Results produced before cancellation still arrive.
    let first = timeout(Duration::from_secs(5), handle.findings.recv())
        .await
        .expect("a finding before cancellation")
        .expect("stream open");
    assert_eq!(first.result.raw, b"fakekey-deadbeefcafe".to_vec());

    token.cancel();

    // The stream closes and the source task ends inside the grace window.
    let drained = timeout(Duration::from_secs(2), async {
        while handle.findings.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "finding channel failed to close");

    timeout(Duration::from_secs(2), handle.source)
        .await
        .expect("source task ends")
        .unwrap()
        .unwrap();
}
