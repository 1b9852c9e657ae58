//! Error types shared across the pipeline

use thiserror::Error;

/// Errors surfaced by a Source.
///
/// `Config` is fatal for the Source and aborts the scan when no other Source
/// is configured. `Fatal` is an unrecoverable backend failure for one
/// resource (a repo, a bucket, a listener); the scan continues on remaining
/// resources. Transient per-item failures are never represented here — they
/// are logged and the item skipped.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{section}: {message}")]
    Fatal {
        section: &'static str,
        message: String,
    },
}

impl SourceError {
    /// Wrap a backend error with the section that was executing when it
    /// occurred.
    pub fn fatal(section: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Fatal {
            section,
            message: err.to_string(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
