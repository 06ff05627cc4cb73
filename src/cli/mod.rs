//! CLI command implementations

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use crate::client::config::DEFAULT_BASE_URL;
use crate::client::{ClientConfig, StatsClient};
use crate::table::TablePath;
use crate::transport::{HttpTransport, Transport};

pub mod error;
pub mod query;
pub mod variables;

pub use error::CliError;
pub use query::QueryCommand;
pub use variables::VariablesCommand;

/// Query Statistics Sweden tables from the command line
#[derive(Parser, Debug)]
#[command(name = "scb-client")]
#[command(about = "Fetch table metadata and data from the Statistics Sweden API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Root of the table hierarchy
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the variables of a table
    Variables(VariablesCommand),

    /// Build, estimate and execute a query against a table
    Query(QueryCommand),
}

/// Create a client for `table`, walking the endpoint hierarchy unless `validate` is off
pub(crate) async fn connect(
    table: TablePath,
    config: ClientConfig,
    validate: bool,
) -> Result<StatsClient, CliError> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
    if validate {
        Ok(StatsClient::create_and_validate(table, transport, config).await?)
    } else {
        Ok(StatsClient::new(table, transport, config))
    }
}

/// Run `fut` under a deadline of `timeout_secs` seconds; 0 means no deadline
pub(crate) async fn with_deadline<T, F>(timeout_secs: u64, fut: F) -> Result<T, CliError>
where
    F: std::future::Future<Output = Result<T, CliError>>,
{
    if timeout_secs == 0 {
        return fut.await;
    }
    tokio::time::timeout(Duration::from_secs(timeout_secs), fut)
        .await
        .map_err(|_| CliError::Timeout(timeout_secs))?
}
