//! Leakhound Core - Foundation crate for the Leakhound scan pipeline
//!
//! This crate provides the shared vocabulary used across all Leakhound crates:
//!
//! - [`domain`] — the chunk/metadata model, connection and credential payloads,
//!   and the progress record sources publish while scanning
//! - [`config`] — strongly-typed scanner configuration with serde defaults
//! - [`infrastructure`] — the shared HTTP client factory, UTF-8 sanitizer,
//!   and verification rate counter
//! - [`logging`] — structured logging with tracing
//!
//! The value that flows through the pipeline is a [`domain::Chunk`]: a bounded
//! byte payload plus provenance. Sources produce chunks, the engine fans them
//! out to detectors, and detector results are tagged back with the chunk's
//! provenance before reaching the caller.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

pub use config::ScannerConfig;
pub use error::SourceError;
pub use logging::init_tracing;
