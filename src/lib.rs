//! # SCB Client Library
//!
//! A client for the SCB (Statistics Sweden) table API. The server refuses any
//! request whose result would exceed a fixed number of data cells, so this
//! library estimates the size of every query before sending it and, when the
//! estimate is too large, splits the request along one variable's values and
//! reassembles the per-partition responses in order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scb_client::{QuerySelection, ResponseFormat, Selection, StatsClient, TablePath};
//! use scb_client::client::ClientConfig;
//! use scb_client::transport::http::HttpTransport;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = TablePath::parse("AM/AM0110/AM0110A/LoneSpridSektorN")?;
//! let transport = Arc::new(HttpTransport::new()?);
//! let client = StatsClient::create_and_validate(table, transport, ClientConfig::default()).await?;
//!
//! let mut selection = QuerySelection::new();
//! selection.insert("Tid", Selection::All);
//! selection.insert("Sektor", Selection::Merge);
//!
//! let query = client.create_query(Some(&selection), ResponseFormat::Json, 0).await?;
//! println!("estimated cells: {}", client.estimate_cell_count(&query));
//! let results = client.execute(&query).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`] - Variable metadata, fetched once per client and cached
//! - [`query`] - Selections, query documents, building and size estimation
//! - [`partition`] - Splitting oversized queries into legal sub-queries
//! - [`client`] - Request execution, rate-limit retries, configuration
//! - [`decode`] - JSON and CSV response decoding
//! - [`transport`] - HTTP capability used by the client
//! - [`table`] - Table path parsing and endpoint URLs
//! - [`output`] - Writing decoded results to files
//! - [`cli`] - Command-line front end used by the `scb-client` binary

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Variable metadata catalog
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// Request execution and client configuration
pub mod client;

/// Response decoding
pub mod decode;

/// Result output writers
pub mod output;

/// Request partitioning under the server limit
pub mod partition;

/// Query selections and documents
pub mod query;

/// Table path parsing
pub mod table;

/// HTTP transport capability
pub mod transport;

// Re-export commonly used types
pub use client::{ClientError, ErrorKind, StatsClient};
pub use decode::DecodedResult;
pub use query::{QueryDocument, QuerySelection, Selection};
pub use table::TablePath;

/// A selectable dimension of a table, as listed by the metadata endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    /// Variable code used on the wire (e.g., "Tid")
    pub code: String,
    /// Display text
    pub text: String,
    /// Legal value codes, in catalog order
    pub values: Vec<String>,
    /// Display texts, parallel to `values`
    #[serde(rename = "valueTexts", default)]
    pub value_texts: Vec<String>,
    /// Whether the variable may be left out of a query
    #[serde(rename = "elimination", default)]
    pub is_elimination: bool,
    /// Whether this is the time variable
    #[serde(rename = "time", default)]
    pub is_time: bool,
}

impl Variable {
    /// Create a variable whose value texts equal its value codes
    pub fn new(code: impl Into<String>, text: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
            value_texts: values.clone(),
            values,
            is_elimination: false,
            is_time: false,
        }
    }

    /// Mark this variable as the time variable
    pub fn with_time(mut self, is_time: bool) -> Self {
        self.is_time = is_time;
        self
    }

    /// Mark this variable as eliminable
    pub fn with_elimination(mut self, is_elimination: bool) -> Self {
        self.is_elimination = is_elimination;
        self
    }

    /// Check whether `value` is part of this variable's domain
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Validate variable metadata integrity
    pub fn validate(&self) -> Result<(), String> {
        if self.code.is_empty() {
            return Err("Variable code cannot be empty".to_string());
        }

        if !self.value_texts.is_empty() && self.value_texts.len() != self.values.len() {
            return Err(format!(
                "Variable {} has {} values but {} value texts",
                self.code,
                self.values.len(),
                self.value_texts.len()
            ));
        }

        Ok(())
    }
}

/// Response format requested from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// JSON with columns, comments and data points
    #[default]
    Json,
    /// Comma-separated text with a header line
    Csv,
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Csv => "csv",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ResponseFormat {
    type Err = query::QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "csv" => Ok(ResponseFormat::Csv),
            _ => Err(query::QueryError::InvalidFormat(s.to_string())),
        }
    }
}
