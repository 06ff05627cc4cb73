//! Construction-time validation of a table path
//!
//! Walks the endpoint hierarchy with one GET per level and checks that each
//! path segment is listed as an `id` by its parent.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::{ClientConfig, ClientError, ClientResult, StatsClient};
use crate::decode::DecodeError;
use crate::table::{TablePath, LEVEL_NAMES};
use crate::transport::Transport;

/// One entry of a level listing
#[derive(Debug, Deserialize)]
struct LevelEntry {
    id: String,
}

impl StatsClient {
    /// Validate `table` against the server, then create a client for it
    ///
    /// Makes four lightweight GET requests (area, category, category
    /// specification, table listings).
    ///
    /// # Errors
    /// * `Connection` - a listing answered with a status other than 200
    /// * `InvalidTable` - a segment is missing from its parent's listing
    pub async fn create_and_validate(
        table: TablePath,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        validate_table(&table, transport.as_ref(), &config.base_url).await?;
        info!(table = %table, "Table path validated");
        Ok(Self::new(table, transport, config))
    }
}

/// Check every segment of `table` against its parent listing
pub async fn validate_table(
    table: &TablePath,
    transport: &dyn Transport,
    base_url: &str,
) -> ClientResult<()> {
    for ((url, id), level) in table.level_urls(base_url).into_iter().zip(LEVEL_NAMES) {
        debug!(%url, id, level, "Validating table path level");

        let response = transport
            .get(&url)
            .await
            .map_err(|e| ClientError::Connection(format!("Couldn't reach {url}: {e}")))?;

        if response.status != 200 {
            return Err(ClientError::Connection(format!(
                "Couldn't retrieve {level} listing from {url} (HTTP {})",
                response.status
            )));
        }

        let entries: Vec<LevelEntry> = serde_json::from_str(&response.text()).map_err(|e| {
            DecodeError::ParseError(format!("Failed to decode {level} listing from {url}: {e}"))
        })?;

        if !entries.iter().any(|entry| entry.id == id) {
            return Err(ClientError::InvalidTable {
                level,
                id: id.to_string(),
                url,
            });
        }
    }

    Ok(())
}
