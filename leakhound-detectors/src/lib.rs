//! Leakhound Detectors - credential matchers and live verification
//!
//! A detector couples a keyword pre-filter, one or more credential regexes,
//! and an optional network verification step. Most vendors are a single row
//! in the [`vendors`] table interpreted by [`spec_detector::SpecDetector`];
//! only detectors with genuinely unusual verification or rendering (JDBC,
//! Okta, PayPal OAuth) get their own implementation.
//!
//! Detectors are stateless singletons: construct the [`DetectorRegistry`]
//! once per process and call it concurrently from any number of workers.

pub mod clean;
pub mod detector;
pub mod false_positive;
pub mod pattern;
pub mod registry;
pub mod result;
pub mod spec_detector;
pub mod vendors;

pub use clean::clean_results;
pub use detector::{Detector, DetectorError};
pub use registry::DetectorRegistry;
pub use result::{DetectorResult, DetectorType};
