//! The detector contract

use async_trait::async_trait;
use thiserror::Error;

use crate::result::{DetectorResult, DetectorType};

/// Non-fatal detector failures. A failing detector contributes no result for
/// the chunk; the scan continues.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("failed to compile pattern for {detector}: {message}")]
    Pattern {
        detector: &'static str,
        message: String,
    },

    #[error("verification request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One vendor's matcher and optional verifier.
///
/// Implementations are stateless and thread-safe; the engine calls
/// `from_data` concurrently from all of its workers.
#[async_trait]
pub trait Detector: Send + Sync {
    fn detector_type(&self) -> DetectorType;

    /// Lowercase substrings used for cheap pre-filtering. A chunk is a
    /// candidate for this detector iff its lowercased data contains at least
    /// one keyword; `from_data` never produces a result otherwise.
    fn keywords(&self) -> &[&'static str];

    /// Run the detector's patterns over `data`. When `verify` is true, each
    /// candidate triggers exactly one HTTP request against the vendor's API;
    /// a 2xx (plus any vendor-specific body check) marks the result verified.
    /// Non-2xx and network failures leave the result unverified.
    async fn from_data(
        &self,
        verify: bool,
        data: &[u8],
    ) -> Result<Vec<DetectorResult>, DetectorError>;
}
