//! Main entry point for the scb-client CLI

use clap::Parser;
use scb_client::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // LOG_FORMAT=json switches to structured output
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scb_client=info"));

    // Logs go to stderr so stdout stays clean for results
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Variables(ref cmd) => cmd.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Query(ref cmd) => cmd.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
