//! Filesystem subcommand

use clap::Args;

use leakhound_core::domain::Connection;

/// Arguments for the filesystem command
#[derive(Args, Debug)]
pub struct FilesystemArgs {
    /// Directories to walk.
    #[arg(required = true)]
    pub directories: Vec<String>,
}

impl FilesystemArgs {
    pub fn connection(&self) -> Connection {
        Connection::Filesystem {
            directories: self.directories.clone(),
        }
    }
}
