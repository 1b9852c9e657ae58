//! Core domain model

pub mod chunk;
pub mod connection;
pub mod credential;
pub mod progress;

pub use chunk::{Chunk, ChunkMetadata, SourceType, CHUNK_SIZE_LIMIT};
pub use connection::Connection;
pub use credential::Credential;
pub use progress::{Progress, ProgressTracker};
