//! The unit of work flowing through the pipeline

use serde::{Deserialize, Serialize};

/// Ceiling on a single text chunk. Larger payloads are split on line
/// boundaries before being emitted.
pub const CHUNK_SIZE_LIMIT: usize = 10 * 1024;

/// Backend kind that produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Git,
    S3,
    Filesystem,
    Syslog,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::S3 => "s3",
            Self::Filesystem => "filesystem",
            Self::Syslog => "syslog",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance for a chunk. One variant per [`SourceType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMetadata {
    Git {
        commit: String,
        file: String,
        /// First line number of the added run in the post-image file.
        line: i64,
        email: String,
        timestamp: String,
        repository: String,
        /// True when the chunk carries a whole binary blob rather than
        /// diff hunk text.
        binary: bool,
    },
    S3 {
        bucket: String,
        file: String,
        link: String,
        email: String,
        timestamp: String,
    },
    Filesystem {
        file: String,
    },
    Syslog {
        hostname: String,
        appname: String,
        procid: String,
        timestamp: String,
        facility: String,
        client: String,
    },
}

impl ChunkMetadata {
    /// The source type this metadata variant belongs to.
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Git { .. } => SourceType::Git,
            Self::S3 { .. } => SourceType::S3,
            Self::Filesystem { .. } => SourceType::Filesystem,
            Self::Syslog { .. } => SourceType::Syslog,
        }
    }

    /// Syslog metadata with every field empty, used when the payload fails
    /// to parse but the raw bytes are still worth scanning.
    pub fn empty_syslog(client: String) -> Self {
        Self::Syslog {
            hostname: String::new(),
            appname: String::new(),
            procid: String::new(),
            timestamp: String::new(),
            facility: String::new(),
            client,
        }
    }
}

/// The unit of work: raw bytes plus provenance. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    /// Human label of the configured source instance.
    pub source_name: String,
    pub source_id: i64,
    pub job_id: i64,
    pub source_type: SourceType,
    /// Never empty; bounded by the producing source's chunking rules.
    pub data: Vec<u8>,
    pub metadata: ChunkMetadata,
    /// Whether detectors should contact remote services for this chunk.
    pub verify: bool,
}

impl Chunk {
    pub fn new(
        source_name: impl Into<String>,
        source_id: i64,
        job_id: i64,
        data: Vec<u8>,
        metadata: ChunkMetadata,
        verify: bool,
    ) -> Self {
        debug_assert!(!data.is_empty(), "chunk data must not be empty");
        let source_type = metadata.source_type();
        Self {
            source_name: source_name.into(),
            source_id,
            job_id,
            source_type,
            data,
            metadata,
            verify,
        }
    }
}
