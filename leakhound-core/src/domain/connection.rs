//! Connection payloads handed to sources at init

use serde::{Deserialize, Serialize};

use super::chunk::SourceType;
use super::credential::Credential;
use crate::error::SourceError;

fn default_s3_max_object_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Connection payload: a tagged union with one variant per source type.
///
/// The variant tag is part of the wire form (`{"git": {...}}`); a Source must
/// check the tag against itself before using the inner payload — see the
/// `expect_*` accessors, which return a `ConfigError` on mismatch rather than
/// silently accepting another source's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Connection {
    Git {
        #[serde(default)]
        repositories: Vec<String>,
        #[serde(default)]
        directories: Vec<String>,
        #[serde(default)]
        credential: Credential,
    },
    Syslog {
        #[serde(default)]
        protocol: String,
        #[serde(default)]
        listen_address: String,
        #[serde(default)]
        tls_cert: String,
        #[serde(default)]
        tls_key: String,
        #[serde(default)]
        format: String,
    },
    S3 {
        buckets: Vec<String>,
        #[serde(default)]
        credential: Credential,
        #[serde(default = "default_s3_max_object_bytes")]
        max_object_bytes: u64,
    },
    Filesystem {
        directories: Vec<String>,
    },
}

impl Connection {
    /// The source type this payload is addressed to.
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Git { .. } => SourceType::Git,
            Self::Syslog { .. } => SourceType::Syslog,
            Self::S3 { .. } => SourceType::S3,
            Self::Filesystem { .. } => SourceType::Filesystem,
        }
    }

    fn mismatch(&self, wanted: SourceType) -> SourceError {
        SourceError::Config(format!(
            "connection payload is addressed to the {} source, not {}",
            self.source_type(),
            wanted
        ))
    }

    pub fn expect_git(self) -> Result<(Vec<String>, Vec<String>, Credential), SourceError> {
        match self {
            Self::Git {
                repositories,
                directories,
                credential,
            } => Ok((repositories, directories, credential)),
            other => Err(other.mismatch(SourceType::Git)),
        }
    }

    pub fn expect_syslog(self) -> Result<SyslogConnection, SourceError> {
        match self {
            Self::Syslog {
                protocol,
                listen_address,
                tls_cert,
                tls_key,
                format,
            } => Ok(SyslogConnection {
                protocol,
                listen_address,
                tls_cert,
                tls_key,
                format,
            }),
            other => Err(other.mismatch(SourceType::Syslog)),
        }
    }

    pub fn expect_s3(self) -> Result<(Vec<String>, Credential, u64), SourceError> {
        match self {
            Self::S3 {
                buckets,
                credential,
                max_object_bytes,
            } => Ok((buckets, credential, max_object_bytes)),
            other => Err(other.mismatch(SourceType::S3)),
        }
    }

    pub fn expect_filesystem(self) -> Result<Vec<String>, SourceError> {
        match self {
            Self::Filesystem { directories } => Ok(directories),
            other => Err(other.mismatch(SourceType::Filesystem)),
        }
    }
}

/// Flattened syslog connection fields. Empty strings mean "use the default";
/// the syslog source normalizes them at init.
#[derive(Debug, Clone)]
pub struct SyslogConnection {
    pub protocol: String,
    pub listen_address: String,
    pub tls_cert: String,
    pub tls_key: String,
    pub format: String,
}
