//! Leakhound - secret scanning pipeline
//!
//! This crate is the command-line front-end over the scan pipeline:
//!
//! - [`leakhound_core`] — chunk model, payloads, shared utilities
//! - [`leakhound_detectors`] — the detector registry and verification
//! - [`leakhound_sources`] — git, syslog, S3, filesystem backends
//! - [`leakhound_engine`] — the pipeline wiring sources to detectors
//!
//! `leakhound <git|filesystem|s3|syslog> [flags]` scans one configured
//! source and prints one JSON line per finding. Exit codes: 0 for a clean
//! scan, 183 when findings are present, 1 for configuration or
//! unrecoverable errors.

pub mod app;
pub mod cli;
