//! Filesystem source behavior on a scratch directory tree.

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use leakhound_core::domain::{Chunk, ChunkMetadata, Connection, SourceType};
use leakhound_sources::{FilesystemSource, Source};

async fn scan(dir: &TempDir) -> Vec<Chunk> {
    let mut source = FilesystemSource::new();
    source
        .init(
            "local files",
            0,
            0,
            false,
            Connection::Filesystem {
                directories: vec![dir.path().to_string_lossy().into_owned()],
            },
            2,
        )
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::channel(1024);
    source
        .chunks(CancellationToken::new(), tx)
        .await
        .expect("scan succeeds");

    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk);
    }
    chunks
}

#[tokio::test]
async fn walks_nested_text_files_and_skips_binaries() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "api_key = abc123\n").unwrap();
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/config.env"), "password=hunter2\n").unwrap();
    std::fs::write(dir.path().join("tool.bin"), b"\x7fELF\x00\x01").unwrap();
    std::fs::write(dir.path().join("empty.txt"), b"").unwrap();

    let chunks = scan(&dir).await;
    assert_eq!(chunks.len(), 2);

    for chunk in &chunks {
        assert_eq!(chunk.source_type, SourceType::Filesystem);
        assert_eq!(chunk.source_name, "local files");
        assert!(!chunk.data.is_empty());
    }

    let mut files: Vec<String> = chunks
        .iter()
        .map(|c| match &c.metadata {
            ChunkMetadata::Filesystem { file } => file.clone(),
            other => panic!("unexpected metadata: {:?}", other),
        })
        .collect();
    files.sort();
    assert!(files[0].ends_with("notes.txt"));
    assert!(files[1].ends_with("config.env"));
}

#[tokio::test]
async fn oversized_text_is_split_on_line_boundaries() {
    let dir = TempDir::new().unwrap();
    // ~64 KiB of lines, well past the 10 KiB chunk ceiling.
    let body: String = (0..4096).map(|i| format!("line {i}\n")).collect();
    std::fs::write(dir.path().join("big.log"), &body).unwrap();

    let chunks = scan(&dir).await;
    assert!(chunks.len() > 1);

    let joined: Vec<u8> = chunks.into_iter().flat_map(|c| c.data).collect();
    assert_eq!(joined, body.into_bytes());
}

#[tokio::test]
async fn missing_directory_is_fatal() {
    let mut source = FilesystemSource::new();
    source
        .init(
            "missing",
            0,
            0,
            false,
            Connection::Filesystem {
                directories: vec!["/definitely/not/a/real/path".into()],
            },
            1,
        )
        .await
        .unwrap();

    let (tx, _rx) = mpsc::channel(4);
    let err = source
        .chunks(CancellationToken::new(), tx)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("filesystem"));
}

#[tokio::test]
async fn empty_directory_list_is_a_config_error() {
    let mut source = FilesystemSource::new();
    let err = source
        .init(
            "no dirs",
            0,
            0,
            false,
            Connection::Filesystem {
                directories: vec![],
            },
            1,
        )
        .await
        .unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn mismatched_payload_is_rejected() {
    let mut source = FilesystemSource::new();
    let err = source
        .init(
            "wrong payload",
            0,
            0,
            false,
            Connection::Syslog {
                protocol: "udp".into(),
                listen_address: String::new(),
                tls_cert: String::new(),
                tls_key: String::new(),
                format: String::new(),
            },
            1,
        )
        .await
        .unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("syslog"));
}
