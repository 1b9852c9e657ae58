//! Git source: commit walking and patch chunking
//!
//! The walk covers every commit reachable from every ref, diffing each
//! commit against each parent (the root commit against the empty tree).
//! Text files become one chunk per contiguous added-line run; binary files
//! (detected by content sniff, never by extension) become a single chunk
//! carrying the whole added-side blob. The sort order is fixed so the same
//! repo state always yields the same chunks.

pub mod repo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use git2::{Commit, Diff, DiffOptions, Patch, Repository, Sort};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use leakhound_core::domain::{
    Chunk, ChunkMetadata, Connection, Credential, Progress, ProgressTracker, SourceType,
};
use leakhound_core::error::SourceError;
use leakhound_core::ScannerConfig;

use crate::chunker::{looks_binary, split_standard};
use crate::source::{normalized_concurrency, Source};

pub use repo::{classify_uri, prepare_repo, PreparedRepo, UriKind};

/// Browser link for a finding. Strips a trailing `.git` from the repo
/// exactly once; an empty `file` links to the commit instead of a blob.
pub fn generate_link(repo: &str, commit: &str, file: &str) -> String {
    let base = repo.strip_suffix(".git").unwrap_or(repo);
    if file.is_empty() {
        format!("{base}/commit/{commit}")
    } else {
        format!("{base}/blob/{commit}/{file}")
    }
}

/// Source that walks git history.
pub struct GitSource {
    name: String,
    job_id: i64,
    source_id: i64,
    verify: bool,
    repositories: Vec<String>,
    directories: Vec<String>,
    credential: Credential,
    concurrency: usize,
    clone_base: PathBuf,
    progress: Arc<ProgressTracker>,
}

impl GitSource {
    pub fn new() -> Self {
        Self::with_config(&ScannerConfig::default())
    }

    pub fn with_config(config: &ScannerConfig) -> Self {
        Self {
            name: String::new(),
            job_id: 0,
            source_id: 0,
            verify: false,
            repositories: Vec::new(),
            directories: Vec::new(),
            credential: Credential::Unauthenticated,
            concurrency: 0,
            clone_base: config.clone_base(),
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    async fn scan_one(
        &self,
        repo_path: PathBuf,
        repo_label: String,
        token: &CancellationToken,
        sink: &mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        let emitter = ChunkEmitter {
            name: self.name.clone(),
            source_id: self.source_id,
            job_id: self.job_id,
            verify: self.verify,
            repository: repo_label,
            sink: sink.clone(),
            token: token.clone(),
            progress: Arc::clone(&self.progress),
        };

        tokio::task::spawn_blocking(move || scan_repository(&repo_path, &emitter))
            .await
            .map_err(|e| SourceError::fatal("git", e))?
    }
}

impl Default for GitSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for GitSource {
    fn source_type(&self) -> SourceType {
        SourceType::Git
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
        let (repositories, directories, credential) = connection.expect_git()?;
        if repositories.is_empty() && directories.is_empty() {
            return Err(SourceError::Config(
                "git connection needs at least one repository or directory".into(),
            ));
        }

        self.name = name.to_string();
        self.job_id = job_id;
        self.source_id = source_id;
        self.verify = verify;
        self.repositories = repositories;
        self.directories = directories;
        self.credential = credential;
        self.concurrency = normalized_concurrency(concurrency);
        Ok(())
    }

    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        let mut resources = 0usize;
        let mut failures: Vec<String> = Vec::new();

        for uri in &self.repositories {
            if token.is_cancelled() {
                return Ok(());
            }
            resources += 1;
            self.progress.set_section(uri.clone());

            // A repo that fails to prepare or scan loses that URL only; the
            // remaining URLs still run.
            let prepared = match prepare_repo(uri, &self.credential, &self.clone_base).await {
                Ok(prepared) => prepared,
                Err(err) => {
                    error!(repository = %uri, error = %err, "failed to prepare repository");
                    failures.push(format!("{uri}: {err}"));
                    continue;
                }
            };

            if let Err(err) = self
                .scan_one(prepared.path.clone(), uri.clone(), &token, &sink)
                .await
            {
                error!(repository = %uri, error = %err, "failed to scan repository");
                failures.push(format!("{uri}: {err}"));
            }
            // `prepared` drops here; a cloned workdir is removed.
        }

        for dir in &self.directories {
            if token.is_cancelled() {
                return Ok(());
            }
            resources += 1;
            self.progress.set_section(dir.clone());

            if let Err(err) = self
                .scan_one(PathBuf::from(dir), dir.clone(), &token, &sink)
                .await
            {
                error!(directory = %dir, error = %err, "failed to scan directory");
                failures.push(format!("{dir}: {err}"));
            }
        }

        if resources > 0 && failures.len() == resources {
            return Err(SourceError::Fatal {
                section: "git",
                message: failures.join("; "),
            });
        }
        Ok(())
    }

    fn progress(&self) -> Progress {
        self.progress.snapshot()
    }
}

/// Everything a blocking repository walk needs to hand chunks back to the
/// async side.
struct ChunkEmitter {
    name: String,
    source_id: i64,
    job_id: i64,
    verify: bool,
    repository: String,
    sink: mpsc::Sender<Chunk>,
    token: CancellationToken,
    progress: Arc<ProgressTracker>,
}

impl ChunkEmitter {
    /// Returns false when the scan should stop (cancelled or sink closed).
    fn emit(&self, data: Vec<u8>, metadata: ChunkMetadata) -> bool {
        if self.token.is_cancelled() || data.is_empty() {
            return !self.token.is_cancelled();
        }
        let chunk = Chunk::new(
            self.name.clone(),
            self.source_id,
            self.job_id,
            data,
            metadata,
            self.verify,
        );
        if self.sink.blocking_send(chunk).is_err() {
            return false;
        }
        self.progress.record_scanned();
        true
    }

    fn emit_text_run(
        &self,
        data: &[u8],
        commit: &str,
        file: &str,
        first_line: i64,
        email: &str,
        timestamp: &str,
    ) -> bool {
        for piece in split_standard(data) {
            let metadata = ChunkMetadata::Git {
                commit: commit.to_string(),
                file: file.to_string(),
                line: first_line + piece.line_offset,
                email: email.to_string(),
                timestamp: timestamp.to_string(),
                repository: self.repository.clone(),
                binary: false,
            };
            if !self.emit(piece.data, metadata) {
                return false;
            }
        }
        true
    }
}

/// Walk every commit reachable from every ref. Runs on the blocking pool.
#[instrument(skip(emitter), fields(repo = %repo_path.display()))]
fn scan_repository(repo_path: &Path, emitter: &ChunkEmitter) -> Result<(), SourceError> {
    let repo = Repository::open(repo_path).map_err(|e| SourceError::fatal("repository", e.message()))?;

    let oids = {
        let mut revwalk = repo
            .revwalk()
            .map_err(|e| SourceError::fatal("revwalk", e.message()))?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(|e| SourceError::fatal("revwalk", e.message()))?;
        revwalk
            .push_glob("refs/*")
            .map_err(|e| SourceError::fatal("revwalk", e.message()))?;
        revwalk.filter_map(|oid| oid.ok()).collect::<Vec<_>>()
    };

    if oids.is_empty() {
        return Err(SourceError::Fatal {
            section: "git",
            message: format!(
                "remote repository {} has no refs to scan",
                emitter.repository
            ),
        });
    }

    let total = oids.len() as u64;
    let progress_interval = (total / 10).max(1);
    info!(repository = %emitter.repository, commits = total, "starting commit walk");

    for (idx, oid) in oids.into_iter().enumerate() {
        if emitter.token.is_cancelled() {
            return Ok(());
        }

        if idx as u64 % progress_interval == 0 {
            emitter.progress.set_complete(
                idx as u64,
                total,
                format!("{idx} of {total} commits scanned"),
            );
        }

        // An unreadable commit is logged and skipped.
        let commit = match repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(err) => {
                warn!(commit = %oid, error = %err, "skipping unreadable commit");
                continue;
            }
        };

        if !scan_commit(&repo, &commit, emitter) {
            return Ok(());
        }
    }

    emitter
        .progress
        .set_complete(total, total, format!("{total} commits scanned"));
    Ok(())
}

/// Diff a commit against each parent (the root commit against the empty
/// tree) and emit its added content. Returns false when the scan should
/// stop.
fn scan_commit(repo: &Repository, commit: &Commit<'_>, emitter: &ChunkEmitter) -> bool {
    let commit_id = commit.id().to_string();
    let email = commit.author().email().unwrap_or("").to_string();
    let timestamp = chrono::DateTime::from_timestamp(commit.time().seconds(), 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    let tree = match commit.tree() {
        Ok(tree) => tree,
        Err(err) => {
            warn!(commit = %commit_id, error = %err, "skipping commit without tree");
            return true;
        }
    };

    let mut opts = DiffOptions::new();
    opts.context_lines(0);

    let parent_trees: Vec<Option<git2::Tree<'_>>> = if commit.parent_count() == 0 {
        vec![None]
    } else {
        commit
            .parents()
            .map(|parent| parent.tree().ok())
            .collect()
    };

    for parent_tree in parent_trees {
        let diff = match repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
        {
            Ok(diff) => diff,
            Err(err) => {
                warn!(commit = %commit_id, error = %err, "skipping undiffable parent");
                continue;
            }
        };

        if !emit_diff(repo, &diff, &commit_id, &email, &timestamp, emitter) {
            return false;
        }
    }

    true
}

fn emit_diff(
    repo: &Repository,
    diff: &Diff<'_>,
    commit_id: &str,
    email: &str,
    timestamp: &str,
    emitter: &ChunkEmitter,
) -> bool {
    for delta_idx in 0..diff.deltas().len() {
        let Some(delta) = diff.get_delta(delta_idx) else {
            continue;
        };
        let file = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Content sniff on the added-side blob decides binary handling; the
        // extension is never consulted.
        if let Ok(blob) = repo.find_blob(delta.new_file().id()) {
            if looks_binary(blob.content()) {
                let metadata = ChunkMetadata::Git {
                    commit: commit_id.to_string(),
                    file: file.clone(),
                    line: 0,
                    email: email.to_string(),
                    timestamp: timestamp.to_string(),
                    repository: emitter.repository.clone(),
                    binary: true,
                };
                if !emitter.emit(blob.content().to_vec(), metadata) {
                    return false;
                }
                continue;
            }
        }

        let patch = match Patch::from_diff(diff, delta_idx) {
            Ok(Some(patch)) => patch,
            Ok(None) => continue,
            Err(err) => {
                warn!(commit = %commit_id, file = %file, error = %err, "skipping unpatchable delta");
                continue;
            }
        };

        if !emit_patch(&patch, commit_id, &file, email, timestamp, emitter) {
            return false;
        }
    }
    true
}

/// Emit one chunk per contiguous `+`-run: added lines only, no `+` prefix,
/// no context lines.
fn emit_patch(
    patch: &Patch<'_>,
    commit_id: &str,
    file: &str,
    email: &str,
    timestamp: &str,
    emitter: &ChunkEmitter,
) -> bool {
    for hunk_idx in 0..patch.num_hunks() {
        let line_count = match patch.num_lines_in_hunk(hunk_idx) {
            Ok(count) => count,
            Err(_) => continue,
        };

        let mut run: Vec<u8> = Vec::new();
        let mut run_start: i64 = 0;

        for line_idx in 0..line_count {
            let line = match patch.line_in_hunk(hunk_idx, line_idx) {
                Ok(line) => line,
                Err(_) => continue,
            };

            if line.origin() == '+' {
                if run.is_empty() {
                    run_start = i64::from(line.new_lineno().unwrap_or(0));
                }
                run.extend_from_slice(line.content());
            } else if !run.is_empty() {
                if !emitter.emit_text_run(&run, commit_id, file, run_start, email, timestamp) {
                    return false;
                }
                run.clear();
            }
        }

        if !run.is_empty()
            && !emitter.emit_text_run(&run, commit_id, file, run_start, email, timestamp)
        {
            return false;
        }
    }
    true
}
