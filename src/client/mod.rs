//! Statistics API client
//!
//! [`StatsClient`] ties the pieces together for one table:
//!
//! 1. **Catalog**: variable metadata via [`crate::catalog::VariableCatalog`]
//! 2. **Query building**: [`StatsClient::create_query`] turns a selection into a document
//! 3. **Estimation**: [`StatsClient::estimate_cell_count`]
//! 4. **Execution**: [`StatsClient::execute`] enforces the client quota, partitions
//!    oversized documents, retries on rate limiting and decodes each response
//!
//! # Error Handling
//!
//! All operations return `Result<T, ClientError>`. [`ClientError::kind`] groups errors so
//! callers can branch:
//! - Configuration and selection errors (fix the call)
//! - Capacity errors (shrink the selection or raise the limits)
//! - Connection errors (not retried)
//! - Rate limiting (retried automatically, surfaced only when a cap is configured)
//! - Payload errors (the response could not be decoded)

use std::sync::Arc;

use crate::catalog::VariableCatalog;
use crate::decode::DecodeError;
use crate::partition::PartitionError;
use crate::query::{estimate, QueryBuilder, QueryDocument, QueryError, QuerySelection};
use crate::table::TablePath;
use crate::transport::{Transport, TransportError};
use crate::{ResponseFormat, Variable};

pub mod config;
pub mod executor;
pub mod retry;
pub mod validate;

pub use config::ClientConfig;
pub use retry::RetryContext;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Query construction error
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Partition planning error
    #[error("partition error: {0}")]
    Partition(#[from] PartitionError),

    /// Response decoding error
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Transport error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Estimated cells exceed the client quota; nothing was sent
    #[error("current size limit {limit} will be exceeded ({estimate} cells); the size limit can be changed with set_size_limit()")]
    QuotaExceeded {
        /// Estimated cells of the query
        estimate: u64,
        /// Configured quota
        limit: u64,
    },

    /// Server kept rate limiting past the configured retry cap
    #[error("still rate limited after {retries} retries at {url}")]
    RateLimited {
        /// Retries made
        retries: u32,
        /// Table URL
        url: String,
    },

    /// Server answered with a status other than success or rate limiting
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Endpoint hierarchy could not be reached during validation
    #[error("connection error: {0}")]
    Connection(String),

    /// A table path segment is not listed at its level
    #[error("{id} doesn't seem to be a valid {level}, please visit {url} for valid entries")]
    InvalidTable {
        /// Level name (area, category, ...)
        level: &'static str,
        /// Segment that was not found
        id: String,
        /// URL listing the valid entries
        url: String,
    },

    /// Invalid client setting
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error categories callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad setting, unknown partition variable, unrecognized format
    Configuration,
    /// Selection does not fit the table
    Selection,
    /// Query too large for the current limits
    Capacity,
    /// Network or HTTP failure
    Connection,
    /// Server rate limiting outlasted the retry cap
    RateLimit,
    /// Response could not be decoded
    Payload,
}

impl ClientError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Query(QueryError::InvalidFormat(_)) => ErrorKind::Configuration,
            ClientError::Query(_) => ErrorKind::Selection,
            ClientError::Partition(PartitionError::UnknownVariable(_)) => ErrorKind::Configuration,
            ClientError::Partition(PartitionError::UnpartitionableSelection { .. }) => {
                ErrorKind::Capacity
            }
            ClientError::QuotaExceeded { .. } => ErrorKind::Capacity,
            ClientError::Decode(_) => ErrorKind::Payload,
            ClientError::RateLimited { .. } => ErrorKind::RateLimit,
            ClientError::Transport(_)
            | ClientError::UnexpectedStatus { .. }
            | ClientError::Connection(_)
            | ClientError::InvalidTable { .. } => ErrorKind::Connection,
            ClientError::InvalidConfiguration(_) => ErrorKind::Configuration,
        }
    }
}

/// Client bound to one table
pub struct StatsClient {
    table: TablePath,
    data_url: String,
    transport: Arc<dyn Transport>,
    catalog: VariableCatalog,
    config: ClientConfig,
}

impl StatsClient {
    /// Create a client without validating the table path
    pub fn new(table: TablePath, transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        let data_url = table.data_url(&config.base_url);
        let catalog = VariableCatalog::new(data_url.clone(), transport.clone());
        Self {
            table,
            data_url,
            transport,
            catalog,
            config,
        }
    }

    /// Create a client whose variables are already known
    pub fn with_variables(
        table: TablePath,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
        variables: Vec<Variable>,
    ) -> Self {
        let data_url = table.data_url(&config.base_url);
        let catalog = VariableCatalog::preloaded(data_url.clone(), transport.clone(), variables);
        Self {
            table,
            data_url,
            transport,
            catalog,
            config,
        }
    }

    /// Table this client is bound to
    pub fn table(&self) -> &TablePath {
        &self.table
    }

    /// Table URL (metadata on GET, data on POST)
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Variables of the table, fetched once and cached
    pub async fn variables(&self) -> ClientResult<&[Variable]> {
        self.catalog.variables().await
    }

    /// Client-side cell quota (0 means no quota)
    pub fn size_limit(&self) -> u64 {
        self.config.size_limit
    }

    /// Set the client-side cell quota; 0 disables it
    pub fn set_size_limit(&mut self, limit: u64) {
        self.config.size_limit = limit;
    }

    /// Preferred partition variable, if set
    pub fn preferred_partition_variable(&self) -> Option<&str> {
        self.config.preferred_partition_variable.as_deref()
    }

    /// Set the variable used to split oversized queries
    ///
    /// # Errors
    /// Returns `InvalidVariable` if the table has no such variable
    pub async fn set_preferred_partition_variable(&mut self, code: &str) -> ClientResult<()> {
        let codes = self.catalog.codes().await?;
        if !codes.iter().any(|c| c == code) {
            return Err(QueryError::InvalidVariable {
                code: code.to_string(),
                valid: codes,
            }
            .into());
        }
        self.config.preferred_partition_variable = Some(code.to_string());
        Ok(())
    }

    /// Go back to splitting on the variable with the most values
    pub fn clear_preferred_partition_variable(&mut self) {
        self.config.preferred_partition_variable = None;
    }

    /// Build a query document for this table
    ///
    /// # Arguments
    /// * `selection` - Directives keyed by variable code; `None` selects everything
    /// * `format` - Response format
    /// * `time_top` - If non-zero, only the latest `time_top` time values
    pub async fn create_query(
        &self,
        selection: Option<&QuerySelection>,
        format: ResponseFormat,
        time_top: usize,
    ) -> ClientResult<QueryDocument> {
        let variables = self.catalog.variables().await?;
        Ok(QueryBuilder::new(variables).build(selection, format, time_top)?)
    }

    /// Number of cells `query` would return
    pub fn estimate_cell_count(&self, query: &QueryDocument) -> u64 {
        estimate(query)
    }
}
