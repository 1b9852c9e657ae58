//! The detector registry

use std::sync::Arc;

use tracing::{info, warn};

use leakhound_core::config::RetryConfig;
use leakhound_core::infrastructure::http::sane_client;

use crate::detector::Detector;
use crate::spec_detector::SpecDetector;
use crate::vendors::{builtin_specs, Jdbc, Okta, PaypalOauth};

/// The full set of detectors, fixed at startup. Construct once per process
/// and share; every detector is stateless and callable from any worker.
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    /// All built-in detectors using the process-wide HTTP client.
    pub fn builtin() -> Self {
        Self::with_client(sane_client().clone(), RetryConfig::default())
    }

    /// All built-in detectors with a caller-provided client. Tests use this
    /// seam to point verification at a mock server.
    pub fn with_client(client: reqwest::Client, retry: RetryConfig) -> Self {
        let mut detectors: Vec<Arc<dyn Detector>> = Vec::new();

        for spec in builtin_specs() {
            match SpecDetector::new(spec, client.clone(), retry.clone()) {
                Ok(detector) => detectors.push(Arc::new(detector)),
                Err(err) => {
                    // A broken table row loses one vendor, not the scan.
                    warn!(error = %err, "skipping detector with invalid pattern");
                }
            }
        }

        detectors.push(Arc::new(Jdbc::new()));
        detectors.push(Arc::new(Okta::new(client.clone(), retry.clone())));
        detectors.push(Arc::new(PaypalOauth::new(client, retry)));

        info!(count = detectors.len(), "detector registry loaded");
        Self { detectors }
    }

    /// Build a registry from an explicit detector set.
    pub fn from_detectors(detectors: Vec<Arc<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_registry_loads_every_vendor() {
        let registry = DetectorRegistry::builtin();
        // Every table row plus the three custom detectors.
        assert_eq!(registry.len(), builtin_specs().len() + 3);

        let mut types = HashSet::new();
        for detector in registry.detectors() {
            assert!(
                types.insert(detector.detector_type()),
                "duplicate detector for {}",
                detector.detector_type()
            );
            assert!(!detector.keywords().is_empty());
        }
    }
}
