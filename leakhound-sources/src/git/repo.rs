//! Repository preparation: URI classification, cloning, credential wiring

use std::path::{Path, PathBuf};

use git2::{build::RepoBuilder, Cred, FetchOptions, RemoteCallbacks};
use tempfile::TempDir;
use tracing::{debug, info};

use leakhound_core::domain::Credential;
use leakhound_core::error::SourceError;

/// What a user-supplied git URI refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriKind {
    /// A repository already on disk; no clone needed.
    Local(PathBuf),
    /// A repository that must be cloned before scanning.
    Remote,
}

/// Classify a git URI. Accepts `http://`, `https://`, `git@…` and `file://`;
/// anything else is a configuration error.
pub fn classify_uri(uri: &str) -> Result<UriKind, SourceError> {
    if let Some(path) = uri.strip_prefix("file://") {
        if path.is_empty() {
            return Err(SourceError::Config(format!("unsupported Git URI: {uri}")));
        }
        return Ok(UriKind::Local(PathBuf::from(path)));
    }
    if uri.starts_with("http://") || uri.starts_with("https://") || uri.starts_with("git@") {
        return Ok(UriKind::Remote);
    }
    Err(SourceError::Config(format!("unsupported Git URI: {uri}")))
}

/// A repository ready to scan. For remote URIs this owns the clone
/// directory, which is removed when the value drops — on every exit path,
/// including cancellation and panic.
#[derive(Debug)]
pub struct PreparedRepo {
    pub path: PathBuf,
    pub remote: bool,
    _workdir: Option<TempDir>,
}

/// Map a git URI to a local repository path, cloning when remote. Cloning
/// runs on the blocking pool; the credential variant decides how the remote
/// is authenticated.
pub async fn prepare_repo(
    uri: &str,
    credential: &Credential,
    clone_base: &Path,
) -> Result<PreparedRepo, SourceError> {
    match classify_uri(uri)? {
        UriKind::Local(path) => {
            debug!(path = %path.display(), "using local repository");
            Ok(PreparedRepo {
                path,
                remote: false,
                _workdir: None,
            })
        }
        UriKind::Remote => {
            std::fs::create_dir_all(clone_base)
                .map_err(|e| SourceError::fatal("clone", e))?;
            let workdir = tempfile::Builder::new()
                .prefix("leakhound-git-")
                .tempdir_in(clone_base)
                .map_err(|e| SourceError::fatal("clone", e))?;
            let dest = workdir.path().to_path_buf();

            info!(repository = %uri, credential = credential.kind(), "cloning repository");

            let uri_owned = uri.to_string();
            let credential = credential.clone();
            let clone_dest = dest.clone();
            tokio::task::spawn_blocking(move || {
                clone_repository(&uri_owned, &clone_dest, &credential)
            })
            .await
            .map_err(|e| SourceError::fatal("clone", e))?
            .map_err(|e| SourceError::fatal("clone", e.message()))?;

            Ok(PreparedRepo {
                path: dest,
                remote: true,
                _workdir: Some(workdir),
            })
        }
    }
}

fn clone_repository(uri: &str, dest: &Path, credential: &Credential) -> Result<(), git2::Error> {
    let mut callbacks = RemoteCallbacks::new();
    let credential = credential.clone();
    callbacks.credentials(move |_url, username_from_url, _allowed| match &credential {
        Credential::BasicAuth { username, password } => {
            Cred::userpass_plaintext(username, password)
        }
        Credential::OAuth { token } => {
            Cred::userpass_plaintext(username_from_url.unwrap_or("x-access-token"), token)
        }
        Credential::KeySecret { key, secret } => Cred::userpass_plaintext(key, secret),
        Credential::SshAuth {
            private_key_pem,
            passphrase,
        } => Cred::ssh_key_from_memory(
            username_from_url.unwrap_or("git"),
            None,
            private_key_pem,
            passphrase.as_deref(),
        ),
        _ => Cred::default(),
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    fetch_options.download_tags(git2::AutotagOption::All);

    RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(uri, dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_is_remote() {
        assert_eq!(
            classify_uri("https://github.com/org/repo.git").unwrap(),
            UriKind::Remote
        );
        assert_eq!(
            classify_uri("http://internal.host/repo").unwrap(),
            UriKind::Remote
        );
    }

    #[test]
    fn scp_style_ssh_is_remote() {
        assert_eq!(
            classify_uri("git@github.com:org/repo.git").unwrap(),
            UriKind::Remote
        );
    }

    #[test]
    fn file_uri_is_local_with_a_path() {
        match classify_uri("file:///p/f.json").unwrap() {
            UriKind::Local(path) => assert_eq!(path, PathBuf::from("/p/f.json")),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn garbage_is_unsupported() {
        let err = classify_uri("no bueno").unwrap_err();
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "invalid configuration: unsupported Git URI: no bueno"
        );
    }

    #[tokio::test]
    async fn prepare_local_file_uri_needs_no_clone() {
        let prepared = prepare_repo(
            "file:///p/f.json",
            &Credential::Unauthenticated,
            Path::new("/tmp"),
        )
        .await
        .unwrap();
        assert!(!prepared.remote);
        assert!(!prepared.path.as_os_str().is_empty());
    }

    #[tokio::test]
    async fn prepare_rejects_unsupported_uri() {
        let err = prepare_repo("no bueno", &Credential::Unauthenticated, Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported Git URI: no bueno"));
    }
}
