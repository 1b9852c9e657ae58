//! Authentication material consumed by sources

use serde::{Deserialize, Serialize};

/// Credential payload, owned by the Source that received it.
///
/// Externally tagged so the serialized form carries the variant name, e.g.
/// `{"basic_auth": {"username": "...", "password": "..."}}`. Unknown fields
/// inside a variant are rejected at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Credential {
    Unauthenticated,
    BasicAuth {
        username: String,
        password: String,
    },
    KeySecret {
        key: String,
        secret: String,
    },
    OAuth {
        token: String,
    },
    SshAuth {
        private_key_pem: String,
        #[serde(default)]
        passphrase: Option<String>,
    },
    GitHubApp {
        app_id: String,
        installation_id: String,
        private_key_pem: String,
    },
}

impl Credential {
    /// Short label for logs. Never includes secret material.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::BasicAuth { .. } => "basic_auth",
            Self::KeySecret { .. } => "key_secret",
            Self::OAuth { .. } => "oauth",
            Self::SshAuth { .. } => "ssh_auth",
            Self::GitHubApp { .. } => "github_app",
        }
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::Unauthenticated
    }
}
