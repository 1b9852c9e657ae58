//! Leakhound Engine - the scan pipeline
//!
//! Glues one [`leakhound_sources::Source`] to the full detector registry:
//! the source drives a bounded chunk channel from its own task, a pool of
//! workers fans every chunk out across the detectors behind the keyword
//! pre-filter, and findings land on the result channel tagged with the
//! chunk's provenance. One cancellation token reaches every part; workers
//! stop between chunks and between detectors, and in-flight verification
//! futures are dropped at the same point.

pub mod engine;

pub use engine::{contains_any_keyword, EngineConfig, Finding, ScanEngine, ScanHandle};
