//! Git subcommand

use anyhow::{Context, Result};
use clap::Args;

use leakhound_core::domain::{Connection, Credential};

/// Arguments for the git command
#[derive(Args, Debug)]
pub struct GitArgs {
    /// Repository URIs (http://, https://, git@…, file://) or local
    /// repository paths.
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Username for basic auth against the remote.
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Password for basic auth against the remote.
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// OAuth token for the remote.
    #[arg(long, conflicts_with_all = ["username", "password", "ssh_key"])]
    pub token: Option<String>,

    /// Path to a private key for SSH remotes.
    #[arg(long)]
    pub ssh_key: Option<std::path::PathBuf>,

    /// Passphrase for the SSH key.
    #[arg(long, requires = "ssh_key")]
    pub ssh_passphrase: Option<String>,
}

impl GitArgs {
    pub fn connection(&self) -> Result<Connection> {
        let credential = if let Some(key_path) = &self.ssh_key {
            let private_key_pem = std::fs::read_to_string(key_path)
                .with_context(|| format!("reading SSH key {}", key_path.display()))?;
            Credential::SshAuth {
                private_key_pem,
                passphrase: self.ssh_passphrase.clone(),
            }
        } else if let Some(token) = &self.token {
            Credential::OAuth {
                token: token.clone(),
            }
        } else if let (Some(username), Some(password)) = (&self.username, &self.password) {
            Credential::BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }
        } else {
            Credential::Unauthenticated
        };

        // URI-shaped targets are repositories to prepare; everything else is
        // a repository already on disk.
        let mut repositories = Vec::new();
        let mut directories = Vec::new();
        for target in &self.targets {
            if target.starts_with("http://")
                || target.starts_with("https://")
                || target.starts_with("git@")
                || target.starts_with("file://")
            {
                repositories.push(target.clone());
            } else {
                directories.push(target.clone());
            }
        }

        Ok(Connection::Git {
            repositories,
            directories,
            credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_split_into_repositories_and_directories() {
        let args = GitArgs {
            targets: vec![
                "https://github.com/org/repo.git".into(),
                "./checkout".into(),
                "git@host:org/repo.git".into(),
            ],
            username: None,
            password: None,
            token: None,
            ssh_key: None,
            ssh_passphrase: None,
        };

        match args.connection().unwrap() {
            Connection::Git {
                repositories,
                directories,
                credential,
            } => {
                assert_eq!(repositories.len(), 2);
                assert_eq!(directories, vec!["./checkout".to_string()]);
                assert!(matches!(credential, Credential::Unauthenticated));
            }
            other => panic!("unexpected connection: {:?}", other),
        }
    }

    #[test]
    fn token_builds_an_oauth_credential() {
        let args = GitArgs {
            targets: vec!["https://github.com/org/repo.git".into()],
            username: None,
            password: None,
            token: Some("gho_token".into()),
            ssh_key: None,
            ssh_passphrase: None,
        };

        match args.connection().unwrap() {
            Connection::Git { credential, .. } => {
                assert!(matches!(credential, Credential::OAuth { .. }));
            }
            other => panic!("unexpected connection: {:?}", other),
        }
    }
}
