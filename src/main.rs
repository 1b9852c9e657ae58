//! Leakhound - Main application entry point

use clap::Parser;

use leakhound::app;
use leakhound::cli::{exit_codes, Cli};
use leakhound_core::init_tracing;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&cli.log_filter) {
        eprintln!("failed to initialize logging: {err}");
    }

    let code = match app::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "scan aborted");
            exit_codes::CONFIG_ERROR
        }
    };

    std::process::exit(code);
}
