//! Leakhound Sources - backends that turn heterogeneous inputs into a
//! uniform stream of chunks
//!
//! Every backend implements [`source::Source`]: decode its connection
//! payload at `init`, then drive the backend in `chunks`, pushing bounded
//! [`leakhound_core::domain::Chunk`]s into the sink until exhausted or
//! cancelled. Sources are created per scan and produce their stream exactly
//! once.

pub mod chunker;
pub mod filesystem;
pub mod git;
pub mod s3;
pub mod source;
pub mod syslog;

pub use filesystem::FilesystemSource;
pub use git::GitSource;
pub use s3::S3Source;
pub use source::{normalized_concurrency, Source};
pub use syslog::SyslogSource;
