//! Response decoding
//!
//! Stateless functions mapping raw response bodies to [`DecodedResult`]s.
//! Values are never reinterpreted: numbers stay strings.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::transport::RawResponse;
use crate::ResponseFormat;

/// Decoding errors
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// JSON body did not have the expected shape
    #[error("parse error: {0}")]
    ParseError(String),

    /// CSV data line field count differs from the header
    #[error("malformed payload: line {line} has {found} fields, header has {expected}")]
    MalformedPayload {
        /// 1-based line number in the body (the header is line 1)
        line: usize,
        /// Header field count
        expected: usize,
        /// Field count found on the line
        found: usize,
    },
}

/// Result type for decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Column descriptor of a JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column code
    pub code: String,
    /// Display text
    pub text: String,
    /// Column type (`d` dimension, `t` time, `c` content)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    /// Any further fields the server sent (units, comments)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One record of a JSON response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Dimension values identifying the cell
    pub key: Vec<String>,
    /// Content values for the cell
    pub values: Vec<String>,
}

/// Decoded JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResult {
    /// Column descriptors
    pub columns: Vec<Column>,
    /// Footnotes
    #[serde(default)]
    pub comments: Vec<Value>,
    /// Records
    pub data: Vec<DataPoint>,
}

/// Decoded CSV response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvResult {
    /// Header names, in header order
    pub column_names: Vec<String>,
    /// One mapping per data line, in line order
    pub data: Vec<HashMap<String, String>>,
}

impl CsvResult {
    /// Fields of record `index` in header order
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        let record = self.data.get(index)?;
        Some(
            self.column_names
                .iter()
                .map(|name| record.get(name).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// Result of one (sub-)request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedResult {
    /// JSON response
    Json(JsonResult),
    /// CSV response
    Csv(CsvResult),
}

impl DecodedResult {
    /// Number of records
    pub fn record_count(&self) -> usize {
        match self {
            DecodedResult::Json(r) => r.data.len(),
            DecodedResult::Csv(r) => r.data.len(),
        }
    }
}

/// Total records across partition results
pub fn flatten_record_count(results: &[DecodedResult]) -> usize {
    results.iter().map(DecodedResult::record_count).sum()
}

/// Stateless response decoder
pub struct ResponseDecoder;

impl ResponseDecoder {
    /// Decode a raw response according to the requested format
    pub fn decode(response: &RawResponse, format: ResponseFormat) -> DecodeResult<DecodedResult> {
        let text = response.text();
        match format {
            ResponseFormat::Json => Self::decode_json(&text).map(DecodedResult::Json),
            ResponseFormat::Csv => Self::decode_csv(&text).map(DecodedResult::Csv),
        }
    }

    /// Decode a JSON body with `columns`, `comments` and `data`
    ///
    /// # Errors
    /// Returns `ParseError` if the body is not JSON or lacks the expected fields
    pub fn decode_json(text: &str) -> DecodeResult<JsonResult> {
        serde_json::from_str(text)
            .map_err(|e| DecodeError::ParseError(format!("Failed to decode JSON response: {e}")))
    }

    /// Decode a comma-separated body with a header line
    ///
    /// Fields may be quoted with double or single quotes; the quotes are removed.
    ///
    /// # Errors
    /// Returns `MalformedPayload` if a data line's field count differs from the header's
    pub fn decode_csv(text: &str) -> DecodeResult<CsvResult> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let column_names: Vec<String> = reader
            .headers()
            .map_err(|e| DecodeError::ParseError(format!("Failed to read CSV header: {e}")))?
            .iter()
            .map(strip_quotes)
            .collect();

        let mut data: Vec<HashMap<String, String>> = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| DecodeError::ParseError(format!("Failed to read CSV line: {e}")))?;

            if record.len() != column_names.len() {
                return Err(DecodeError::MalformedPayload {
                    line: record.position().map_or(0, |p| p.line() as usize),
                    expected: column_names.len(),
                    found: record.len(),
                });
            }

            data.push(
                column_names
                    .iter()
                    .cloned()
                    .zip(record.iter().map(strip_quotes))
                    .collect(),
            );
        }

        Ok(CsvResult { column_names, data })
    }
}

/// Remove one pair of surrounding single quotes (double quotes are handled by the reader)
fn strip_quotes(field: &str) -> String {
    field
        .strip_prefix('\'')
        .and_then(|f| f.strip_suffix('\''))
        .unwrap_or(field)
        .to_string()
}
