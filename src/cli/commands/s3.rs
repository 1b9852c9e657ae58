//! S3 subcommand

use clap::Args;

use leakhound_core::domain::{Connection, Credential};

fn default_max_object_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Arguments for the s3 command
#[derive(Args, Debug)]
pub struct S3Args {
    /// Buckets to enumerate.
    #[arg(long = "bucket", required = true)]
    pub buckets: Vec<String>,

    /// AWS access key id. Falls back to AWS_ACCESS_KEY_ID.
    #[arg(long, env = "AWS_ACCESS_KEY_ID", requires = "secret")]
    pub key: Option<String>,

    /// AWS secret access key. Falls back to AWS_SECRET_ACCESS_KEY.
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true, requires = "key")]
    pub secret: Option<String>,

    /// Skip objects larger than this many bytes.
    #[arg(long, default_value_t = default_max_object_bytes())]
    pub max_object_bytes: u64,
}

impl S3Args {
    pub fn connection(&self) -> Connection {
        let credential = match (&self.key, &self.secret) {
            (Some(key), Some(secret)) => Credential::KeySecret {
                key: key.clone(),
                secret: secret.clone(),
            },
            _ => Credential::Unauthenticated,
        };

        Connection::S3 {
            buckets: self.buckets.clone(),
            credential,
            max_object_bytes: self.max_object_bytes,
        }
    }
}
