//! Syslog subcommand

use anyhow::{Context, Result};
use clap::Args;

use leakhound_core::domain::Connection;

/// Arguments for the syslog command
#[derive(Args, Debug)]
pub struct SyslogArgs {
    /// Transport protocol: tcp or udp. Defaults to udp, or tcp when TLS
    /// material is given.
    #[arg(long, default_value = "")]
    pub protocol: String,

    /// Listen address; ":5140" when omitted.
    #[arg(long, default_value = "")]
    pub address: String,

    /// Path to a PEM certificate for TLS over TCP.
    #[arg(long, requires = "tls_key")]
    pub tls_cert: Option<std::path::PathBuf>,

    /// Path to the PEM private key for TLS over TCP.
    #[arg(long, requires = "tls_cert")]
    pub tls_key: Option<std::path::PathBuf>,

    /// Wire format: rfc3164 or rfc5424.
    #[arg(long, default_value = "")]
    pub format: String,
}

impl SyslogArgs {
    pub fn connection(&self) -> Result<Connection> {
        let tls_cert = match &self.tls_cert {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading TLS certificate {}", path.display()))?,
            None => String::new(),
        };
        let tls_key = match &self.tls_key {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading TLS key {}", path.display()))?,
            None => String::new(),
        };

        Ok(Connection::Syslog {
            protocol: self.protocol.clone(),
            listen_address: self.address.clone(),
            tls_cert,
            tls_key,
            format: self.format.clone(),
        })
    }
}
