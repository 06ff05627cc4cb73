//! Variable metadata catalog
//!
//! Variables are fetched with one GET on the table URL the first time they are
//! needed and cached for the lifetime of the catalog. There is no invalidation;
//! build a new client to refresh.

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::client::{ClientError, ClientResult};
use crate::decode::DecodeError;
use crate::transport::Transport;
use crate::Variable;

/// Shape of the table metadata response
#[derive(Debug, Deserialize)]
struct TableMetadata {
    #[serde(default)]
    title: String,
    variables: Vec<Variable>,
}

/// Lazily fetched, cached variable list of one table
pub struct VariableCatalog {
    url: String,
    transport: Arc<dyn Transport>,
    cache: OnceCell<Vec<Variable>>,
}

impl VariableCatalog {
    /// Catalog that fetches from `url` on first access
    pub fn new(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: url.into(),
            transport,
            cache: OnceCell::new(),
        }
    }

    /// Catalog with variables already known; never hits the network
    pub fn preloaded(
        url: impl Into<String>,
        transport: Arc<dyn Transport>,
        variables: Vec<Variable>,
    ) -> Self {
        Self {
            url: url.into(),
            transport,
            cache: OnceCell::new_with(Some(variables)),
        }
    }

    /// Table URL the catalog reads from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Variables, fetching them on first call
    pub async fn variables(&self) -> ClientResult<&[Variable]> {
        let variables = self.cache.get_or_try_init(|| self.fetch()).await?;
        Ok(variables.as_slice())
    }

    /// Variables if already cached
    pub fn cached(&self) -> Option<&[Variable]> {
        self.cache.get().map(Vec::as_slice)
    }

    /// Codes of all variables, in catalog order
    pub async fn codes(&self) -> ClientResult<Vec<String>> {
        Ok(self.variables().await?.iter().map(|v| v.code.clone()).collect())
    }

    async fn fetch(&self) -> ClientResult<Vec<Variable>> {
        debug!(url = %self.url, "Fetching variable metadata");
        let response = self.transport.get(&self.url).await?;
        if !response.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: response.status,
                url: self.url.clone(),
            });
        }

        let metadata: TableMetadata = serde_json::from_str(&response.text()).map_err(|e| {
            DecodeError::ParseError(format!("Failed to decode table metadata: {e}"))
        })?;

        for variable in &metadata.variables {
            variable.validate().map_err(DecodeError::ParseError)?;
        }

        info!(
            title = %metadata.title,
            variables = metadata.variables.len(),
            "Loaded variable metadata"
        );
        Ok(metadata.variables)
    }
}
