//! CLI error types and conversions

use crate::client::ClientError;
use crate::output::OutputError;
use crate::table::TablePathError;
use crate::transport::TransportError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Table path error
    #[error("{0}")]
    TablePath(#[from] TablePathError),

    /// Client error
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Transport setup error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Command did not finish before its deadline
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
