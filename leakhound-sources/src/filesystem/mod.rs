//! Filesystem source: directory walks into per-file chunks

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use leakhound_core::domain::{
    Chunk, ChunkMetadata, Connection, Progress, ProgressTracker, SourceType,
};
use leakhound_core::error::SourceError;

use crate::chunker::{looks_binary, split_standard};
use crate::source::{normalized_concurrency, Source};

/// Files above this are skipped rather than read into memory.
const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Source that walks local directories.
pub struct FilesystemSource {
    name: String,
    job_id: i64,
    source_id: i64,
    verify: bool,
    directories: Vec<String>,
    concurrency: usize,
    progress: Arc<ProgressTracker>,
}

impl FilesystemSource {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            job_id: 0,
            source_id: 0,
            verify: false,
            directories: Vec::new(),
            concurrency: 0,
            progress: Arc::new(ProgressTracker::new()),
        }
    }
}

impl Default for FilesystemSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for FilesystemSource {
    fn source_type(&self) -> SourceType {
        SourceType::Filesystem
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
        let directories = connection.expect_filesystem()?;
        if directories.is_empty() {
            return Err(SourceError::Config(
                "filesystem connection needs at least one directory".into(),
            ));
        }

        self.name = name.to_string();
        self.job_id = job_id;
        self.source_id = source_id;
        self.verify = verify;
        self.directories = directories;
        self.concurrency = normalized_concurrency(concurrency);
        Ok(())
    }

    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        let mut failures: Vec<String> = Vec::new();

        for dir in &self.directories {
            if token.is_cancelled() {
                return Ok(());
            }
            self.progress.set_section(dir.clone());

            let walker = DirectoryWalker {
                name: self.name.clone(),
                source_id: self.source_id,
                job_id: self.job_id,
                verify: self.verify,
                root: PathBuf::from(dir),
                token: token.clone(),
                sink: sink.clone(),
                progress: Arc::clone(&self.progress),
            };

            let outcome = tokio::task::spawn_blocking(move || walker.walk())
                .await
                .map_err(|e| SourceError::fatal("filesystem", e))?;

            if let Err(err) = outcome {
                error!(directory = %dir, error = %err, "failed to walk directory");
                failures.push(format!("{dir}: {err}"));
            }
        }

        if !self.directories.is_empty() && failures.len() == self.directories.len() {
            return Err(SourceError::Fatal {
                section: "filesystem",
                message: failures.join("; "),
            });
        }
        Ok(())
    }

    fn progress(&self) -> Progress {
        self.progress.snapshot()
    }
}

struct DirectoryWalker {
    name: String,
    source_id: i64,
    job_id: i64,
    verify: bool,
    root: PathBuf,
    token: CancellationToken,
    sink: mpsc::Sender<Chunk>,
    progress: Arc<ProgressTracker>,
}

impl DirectoryWalker {
    fn walk(&self) -> Result<(), SourceError> {
        if !self.root.exists() {
            return Err(SourceError::Fatal {
                section: "filesystem",
                message: format!("directory does not exist: {}", self.root.display()),
            });
        }

        for entry in walkdir::WalkDir::new(&self.root).follow_links(false) {
            if self.token.is_cancelled() {
                return Ok(());
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "error accessing file entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "failed to stat file");
                    continue;
                }
            };
            if size == 0 {
                continue;
            }
            if size > MAX_FILE_BYTES {
                debug!(file = %path.display(), size, "skipping file over the size ceiling");
                self.progress.record_skipped();
                continue;
            }

            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "failed to read file");
                    self.progress.record_skipped();
                    continue;
                }
            };
            if looks_binary(&data) {
                debug!(file = %path.display(), "skipping binary file");
                self.progress.record_skipped();
                continue;
            }

            let file = path.to_string_lossy().into_owned();
            for piece in split_standard(&data) {
                let chunk = Chunk::new(
                    self.name.clone(),
                    self.source_id,
                    self.job_id,
                    piece.data,
                    ChunkMetadata::Filesystem { file: file.clone() },
                    self.verify,
                );
                if self.sink.blocking_send(chunk).is_err() {
                    return Ok(());
                }
                self.progress.record_scanned();
            }
        }

        Ok(())
    }
}
