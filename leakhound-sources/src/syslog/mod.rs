//! Syslog source: TCP/UDP/TLS listeners emitting one chunk per message
//!
//! The listener transport is decided by `(protocol, TLS material present)`:
//! TLS over TCP, plain TCP, or UDP; TLS over UDP is rejected at init. Each
//! accepted TCP connection gets its own worker holding a semaphore permit,
//! so parallel connections are bounded by the CPU count.

pub mod parser;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;
use tokio_rustls::rustls;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use leakhound_core::domain::{
    Chunk, ChunkMetadata, Connection, Progress, ProgressTracker, SourceType,
};
use leakhound_core::error::SourceError;

use crate::source::{normalized_concurrency, Source};

pub use parser::{parse_metadata, SyslogFormat};

/// Read buffer for one TCP read; one read is one chunk.
const TCP_BUFFER: usize = 8 * 1024;
/// Receive buffer for one UDP packet; one packet is one chunk.
const UDP_BUFFER: usize = 65535;
/// Read deadline, re-armed before every read so workers observe
/// cancellation promptly.
const READ_DEADLINE: Duration = Duration::from_secs(1);

const DEFAULT_LISTEN: &str = ":5140";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Tcp,
    Udp,
}

/// Source that listens for syslog traffic. The stream is unbounded; it ends
/// only on cancellation or a fatal listener error.
pub struct SyslogSource {
    name: String,
    job_id: i64,
    source_id: i64,
    verify: bool,
    protocol: Protocol,
    listen: String,
    tls: Option<(String, String)>,
    format: SyslogFormat,
    concurrency: usize,
    progress: Arc<ProgressTracker>,
}

impl SyslogSource {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            job_id: 0,
            source_id: 0,
            verify: false,
            protocol: Protocol::Udp,
            listen: DEFAULT_LISTEN.to_string(),
            tls: None,
            format: SyslogFormat::Rfc3164,
            concurrency: 0,
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    fn bind_address(&self) -> String {
        // A bare ":port" listens on every interface.
        if let Some(rest) = self.listen.strip_prefix(':') {
            format!("0.0.0.0:{rest}")
        } else {
            self.listen.clone()
        }
    }

    fn worker(&self, token: &CancellationToken, sink: &mpsc::Sender<Chunk>) -> MessageWorker {
        MessageWorker {
            name: self.name.clone(),
            source_id: self.source_id,
            job_id: self.job_id,
            verify: self.verify,
            format: self.format,
            token: token.clone(),
            sink: sink.clone(),
            progress: Arc::clone(&self.progress),
        }
    }

    fn tls_acceptor(&self, cert_pem: &str, key_pem: &str) -> Result<TlsAcceptor, SourceError> {
        let certs = rustls_pemfile::certs(&mut cert_pem.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SourceError::fatal("tls", e))?;
        let key = rustls_pemfile::private_key(&mut key_pem.as_bytes())
            .map_err(|e| SourceError::fatal("tls", e))?
            .ok_or_else(|| SourceError::Config("TLS key material contains no private key".into()))?;

        let config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| SourceError::fatal("tls", e))?;
        Ok(TlsAcceptor::from(Arc::new(config)))
    }

    async fn accept_tcp(
        &self,
        acceptor: Option<TlsAcceptor>,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        let addr = self.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| SourceError::fatal("listener", e))?;
        self.progress.set_section(addr.clone());
        info!(listen = %addr, tls = acceptor.is_some(), "syslog listener started");

        // Bounds parallel per-connection workers.
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            let permit = tokio::select! {
                _ = token.cancelled() => return Ok(()),
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return Ok(()),
                },
            };

            let (stream, peer) = tokio::select! {
                _ = token.cancelled() => return Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        debug!(error = %err, "failed to accept connection");
                        continue;
                    }
                },
            };

            let worker = self.worker(&token, &sink);
            let client = peer.to_string();
            match acceptor.clone() {
                Some(acceptor) => {
                    tokio::spawn(async move {
                        let _permit = permit;
                        match acceptor.accept(stream).await {
                            Ok(tls_stream) => worker.monitor(tls_stream, client).await,
                            Err(err) => debug!(error = %err, "TLS handshake failed"),
                        }
                    });
                }
                None => {
                    tokio::spawn(async move {
                        let _permit = permit;
                        worker.monitor(stream, client).await;
                    });
                }
            }
        }
    }

    async fn recv_udp(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        let addr = self.bind_address();
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|e| SourceError::fatal("listener", e))?;
        self.progress.set_section(addr.clone());
        info!(listen = %addr, "syslog UDP listener started");

        let worker = self.worker(&token, &sink);
        let mut buf = vec![0u8; UDP_BUFFER];

        loop {
            if token.is_cancelled() {
                return Ok(());
            }
            match timeout(READ_DEADLINE, socket.recv_from(&mut buf)).await {
                Err(_) => continue,
                Ok(Ok((0, _))) => continue,
                Ok(Ok((n, peer))) => {
                    if !worker.emit(&buf[..n], &peer.to_string()).await {
                        return Ok(());
                    }
                }
                Ok(Err(err)) => {
                    debug!(error = %err, "UDP read failed");
                    continue;
                }
            }
        }
    }
}

impl Default for SyslogSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for SyslogSource {
    fn source_type(&self) -> SourceType {
        SourceType::Syslog
    }

    async fn init(
        &mut self,
        name: &str,
        job_id: i64,
        source_id: i64,
        verify: bool,
        connection: Connection,
        concurrency: usize,
    ) -> Result<(), SourceError> {
        let conn = connection.expect_syslog()?;

        let tls_enabled = !conn.tls_cert.is_empty() || !conn.tls_key.is_empty();
        let protocol = match conn.protocol.as_str() {
            "" => {
                if tls_enabled {
                    Protocol::Tcp
                } else {
                    Protocol::Udp
                }
            }
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            other => {
                return Err(SourceError::Config(format!(
                    "unknown syslog protocol: {other}"
                )))
            }
        };

        if protocol == Protocol::Udp && tls_enabled {
            return Err(SourceError::Config("TLS is not supported over UDP".into()));
        }

        let format = SyslogFormat::from_config(&conn.format).ok_or_else(|| {
            SourceError::Config(format!("unknown syslog format: {}", conn.format))
        })?;

        self.name = name.to_string();
        self.job_id = job_id;
        self.source_id = source_id;
        self.verify = verify;
        self.protocol = protocol;
        self.listen = if conn.listen_address.is_empty() {
            DEFAULT_LISTEN.to_string()
        } else {
            conn.listen_address
        };
        self.tls = tls_enabled.then(|| (conn.tls_cert, conn.tls_key));
        self.format = format;
        self.concurrency = normalized_concurrency(concurrency);
        Ok(())
    }

    async fn chunks(
        &self,
        token: CancellationToken,
        sink: mpsc::Sender<Chunk>,
    ) -> Result<(), SourceError> {
        match (&self.tls, self.protocol) {
            (Some((cert, key)), Protocol::Tcp) => {
                let acceptor = self.tls_acceptor(cert, key)?;
                self.accept_tcp(Some(acceptor), token, sink).await
            }
            (None, Protocol::Tcp) => self.accept_tcp(None, token, sink).await,
            (None, Protocol::Udp) => self.recv_udp(token, sink).await,
            // Rejected at init; unreachable through the public lifecycle.
            (Some(_), Protocol::Udp) => {
                Err(SourceError::Config("TLS is not supported over UDP".into()))
            }
        }
    }

    fn progress(&self) -> Progress {
        self.progress.snapshot()
    }
}

/// Per-message work shared by all transports: parse the header, emit the
/// chunk.
struct MessageWorker {
    name: String,
    source_id: i64,
    job_id: i64,
    verify: bool,
    format: SyslogFormat,
    token: CancellationToken,
    sink: mpsc::Sender<Chunk>,
    progress: Arc<ProgressTracker>,
}

impl MessageWorker {
    /// One read is one chunk. A message larger than the buffer, or several
    /// messages inside one TCP segment, will be mis-framed; known
    /// limitation of the read-per-chunk model.
    async fn monitor<S>(&self, mut stream: S, client: String)
    where
        S: AsyncRead + Unpin + Send,
    {
        let mut buf = vec![0u8; TCP_BUFFER];
        loop {
            if self.token.is_cancelled() {
                return;
            }
            match timeout(READ_DEADLINE, stream.read(&mut buf)).await {
                // Deadline: loop around so cancellation is observed.
                Err(_) => continue,
                Ok(Ok(0)) => return,
                Ok(Ok(n)) => {
                    if !self.emit(&buf[..n], &client).await {
                        return;
                    }
                }
                Ok(Err(err)) => {
                    debug!(client = %client, error = %err, "connection read failed");
                    continue;
                }
            }
        }
    }

    /// Returns false when the scan is shutting down.
    async fn emit(&self, data: &[u8], client: &str) -> bool {
        let metadata = match parse_metadata(self.format, data, client) {
            Some(metadata) => metadata,
            None => {
                // The raw bytes may still contain secrets; emit with empty
                // header fields.
                debug!(client = %client, "failed to parse syslog header");
                ChunkMetadata::empty_syslog(client.to_string())
            }
        };

        let chunk = Chunk::new(
            self.name.clone(),
            self.source_id,
            self.job_id,
            data.to_vec(),
            metadata,
            self.verify,
        );

        tokio::select! {
            _ = self.token.cancelled() => false,
            sent = self.sink.send(chunk) => {
                if sent.is_ok() {
                    self.progress.record_scanned();
                    true
                } else {
                    false
                }
            }
        }
    }
}
