//! S3 source: bucket enumeration into per-object chunks

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use leakhound_core::domain::{
    Chunk, ChunkMetadata, Connection, Credential, Progress, ProgressTracker, SourceType,
};
use leakhound_core::error::SourceError;

use crate::chunker::looks_binary;
use crate::source::{normalized_concurrency, Source};

const DEFAULT_REGION: &str = "us-east-1";

/// Source that enumerates S3 buckets, one chunk per readable text object.
pub struct S3Source {
    name: String,
    job_id: i64,
    source_id: i64,
    verify: bool,
    buckets: Vec<String>,
    credential: Credential,
    max_object_bytes: u64,
    concurrency: usize,
    progress: Arc<ProgressTracker>,
}

impl S3Source {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            job_id: 0,
            source_id: 0,
            verify: false,
            buckets: Vec::new(),
            credential: Credential::Unauthenticated,
            max_object_bytes: 0,
            concurrency: 0,
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    async fn build_client(&self) -> Result<S3Client, SourceError> {
        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(DEFAULT_REGION));

        let shared = match &self.credential {
            Credential::KeySecret { key, secret } => {
                loader
                    .credentials_provider(Credentials::from_keys(key, secret, None))
                    .load()
                    .await
            }
            Credential::Unauthenticated => loader.no_credentials().load().await,
            other => {
                return Err(SourceError::Config(format!(
                    "unsupported credential for the S3 source: {}",
                    other.kind()
                )))
            }
        };

        Ok(S3Client::new(&shared))
    }

    async fn scan_bucket(
        &self,
        client: &S3Client,
        bucket: &str,
        token: &CancellationToken,
        sink: &mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        info!(bucket, "listing bucket");
        let mut scanned: u64 = 0;

        let mut pages = client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            // A failing listing is fatal for the bucket.
            let page = page.map_err(|e| SourceError::fatal("list objects", e))?;

            for object in page.contents() {
                if token.is_cancelled() {
                    return Ok(());
                }

                let key = object.key().unwrap_or_default();
                if key.is_empty() || key.ends_with('/') {
                    continue;
                }

                let size = object.size().unwrap_or(0);
                if size <= 0 || size as u64 > self.max_object_bytes {
                    debug!(bucket, key, size, "skipping object outside size bounds");
                    self.progress.record_skipped();
                    continue;
                }

                let timestamp = object
                    .last_modified()
                    .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), 0))
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();

                // A single unreadable object is transient: log and move on.
                let body = match client.get_object().bucket(bucket).key(key).send().await {
                    Ok(output) => match output.body.collect().await {
                        Ok(collected) => collected.into_bytes(),
                        Err(err) => {
                            warn!(bucket, key, error = %err, "failed to read object body");
                            self.progress.record_skipped();
                            continue;
                        }
                    },
                    Err(err) => {
                        warn!(bucket, key, error = %err, "failed to fetch object");
                        self.progress.record_skipped();
                        continue;
                    }
                };

                if body.is_empty() {
                    continue;
                }
                if looks_binary(&body) {
                    debug!(bucket, key, "skipping binary object");
                    self.progress.record_skipped();
                    continue;
                }

                let metadata = ChunkMetadata::S3 {
                    bucket: bucket.to_string(),
                    file: key.to_string(),
                    link: format!("https://{bucket}.s3.amazonaws.com/{key}"),
                    email: String::new(),
                    timestamp,
                };
                let chunk = Chunk::new(
                    self.name.clone(),
                    self.source_id,
                    self.job_id,
                    body.to_vec(),
                    metadata,
                    self.verify,
                );

                tokio::select! {
                    _ = token.cancelled() => return Ok(()),
                    sent = sink.send(chunk) => {
                        if sent.is_err() {
                            return Ok(());
                        }
                        self.progress.record_scanned();
                        scanned += 1;
                    }
                }
            }
        }

        info!(bucket, objects = scanned, "bucket scan complete");
        Ok(())
    }
}

impl Default for S3Source {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for S3Source {
    fn source_type(&self) -> SourceType {
        SourceType::S3
    }

    async fn init(
        &mut self,
        name: &str,
        job_id: i64,
        source_id: i64,
        verify: bool,
        connection: Connection,
        concurrency: usize,
    ) -> Result<(), SourceError> {
        let (buckets, credential, max_object_bytes) = connection.expect_s3()?;
        if buckets.is_empty() {
            return Err(SourceError::Config(
                "s3 connection needs at least one bucket".into(),
            ));
        }
        if max_object_bytes == 0 {
            return Err(SourceError::Config(
                "s3 max_object_bytes must be positive".into(),
            ));
        }

        self.name = name.to_string();
        self.job_id = job_id;
        self.source_id = source_id;
        self.verify = verify;
        self.buckets = buckets;
        self.credential = credential;
        self.max_object_bytes = max_object_bytes;
        self.concurrency = normalized_concurrency(concurrency);
        Ok(())
    }

    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        let client = self.build_client().await?;

        let mut failures: Vec<String> = Vec::new();
        for bucket in &self.buckets {
            if token.is_cancelled() {
                return Ok(());
            }
            self.progress.set_section(bucket.clone());

            if let Err(err) = self.scan_bucket(&client, bucket, &token, &sink).await {
                error!(bucket, error = %err, "failed to scan bucket");
                failures.push(format!("{bucket}: {err}"));
            }
        }

        if !self.buckets.is_empty() && failures.len() == self.buckets.len() {
            return Err(SourceError::Fatal {
                section: "s3",
                message: failures.join("; "),
            });
        }
        Ok(())
    }

    fn progress(&self) -> Progress {
        self.progress.snapshot()
    }
}
