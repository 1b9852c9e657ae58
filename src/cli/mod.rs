//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

use self::commands::{filesystem::FilesystemArgs, git::GitArgs, s3::S3Args, syslog::SyslogArgs};

/// Process exit codes.
pub mod exit_codes {
    /// Scan completed with no findings.
    pub const OK: i32 = 0;
    /// Configuration error or every configured resource failed.
    pub const CONFIG_ERROR: i32 = 1;
    /// Scan completed and findings are present ("triggered").
    pub const FINDINGS: i32 = 183;
}

/// Find and verify leaked credentials.
#[derive(Parser, Debug)]
#[command(name = "leakhound", version, about)]
pub struct Cli {
    /// Contact each vendor to check whether matched credentials are live.
    #[arg(long, global = true)]
    pub verify: bool,

    /// Only print findings confirmed live by the issuing service.
    #[arg(long = "results-only-verified", global = true)]
    pub only_verified: bool,

    /// Detector worker count; 0 uses the host CPU count.
    #[arg(long, global = true, default_value_t = 0)]
    pub concurrency: usize,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan git history: remote URLs or local repository paths.
    Git(GitArgs),
    /// Scan local directories file by file.
    Filesystem(FilesystemArgs),
    /// Scan the objects in S3 buckets.
    S3(S3Args),
    /// Listen for syslog traffic and scan each message.
    Syslog(SyslogArgs),
}

impl Command {
    /// Label used as the source instance name and in logs.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::Git(_) => "git",
            Self::Filesystem(_) => "filesystem",
            Self::S3(_) => "s3",
            Self::Syslog(_) => "syslog",
        }
    }
}
