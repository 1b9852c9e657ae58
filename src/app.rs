//! Scan orchestration for the CLI

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use leakhound_detectors::DetectorRegistry;
use leakhound_engine::{EngineConfig, ScanEngine};
use leakhound_sources::{FilesystemSource, GitSource, S3Source, Source, SyslogSource};

use crate::cli::{exit_codes, Cli, Command};

/// Run one scan to completion and produce the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    let label = cli.command.source_label();

    let (mut source, connection): (Box<dyn Source>, _) = match &cli.command {
        Command::Git(args) => (Box::new(GitSource::new()) as _, args.connection()?),
        Command::Filesystem(args) => (Box::new(FilesystemSource::new()) as _, args.connection()),
        Command::S3(args) => (Box::new(S3Source::new()) as _, args.connection()),
        Command::Syslog(args) => (Box::new(SyslogSource::new()) as _, args.connection()?),
    };

    if let Err(err) = source
        .init(label, 0, 0, cli.verify, connection, cli.concurrency)
        .await
    {
        error!(source = label, error = %err, "source failed to initialize");
        return Ok(exit_codes::CONFIG_ERROR);
    }

    let engine = ScanEngine::new(
        DetectorRegistry::builtin(),
        EngineConfig {
            concurrency: cli.concurrency,
            ..Default::default()
        },
    );

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("interrupt received, draining scan");
            signal_token.cancel();
        }
    });

    let mut handle = engine.scan(Arc::from(source), token);

    let mut findings = 0usize;
    while let Some(finding) = handle.findings.recv().await {
        if cli.only_verified && !finding.result.verified {
            continue;
        }
        findings += 1;
        match serde_json::to_string(&finding) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(error = %err, "failed to render finding"),
        }
    }

    info!(
        findings,
        verifications = engine.verifications_total(),
        "scan complete"
    );

    match handle.source.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            // The only configured source failed outright.
            error!(source = label, error = %err, "source failed");
            return Ok(exit_codes::CONFIG_ERROR);
        }
        Err(err) => {
            error!(source = label, error = %err, "source task panicked");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    }

    if findings > 0 {
        Ok(exit_codes::FINDINGS)
    } else {
        Ok(exit_codes::OK)
    }
}
