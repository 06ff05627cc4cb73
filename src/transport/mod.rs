//! HTTP transport capability
//!
//! The client never talks to the network directly. Everything goes through a
//! [`Transport`], which returns the raw status and body and leaves the
//! interpretation (rate limiting, decoding) to the caller.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

pub mod http;

pub use http::HttpTransport;

/// HTTP status the server uses to signal "too many requests"
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// UTF-8 byte-order mark the server prefixes to JSON and CSV bodies
const UTF8_BOM: &str = "\u{feff}";

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request could not be sent or the response could not be read
    #[error("network error: {0}")]
    Network(String),

    /// HTTP client could not be constructed
    #[error("HTTP client build error: {0}")]
    Build(String),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Undecoded response body
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server asked us to slow down
    pub fn is_rate_limited(&self) -> bool {
        self.status == STATUS_TOO_MANY_REQUESTS
    }

    /// Body as text with any leading byte-order mark removed
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn text(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string()
    }
}

/// Minimal HTTP capability consumed by the catalog and the request executor
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request without a body
    async fn get(&self, url: &str) -> TransportResult<RawResponse>;

    /// Issue a POST request with a JSON body
    async fn post(&self, url: &str, body: &Value) -> TransportResult<RawResponse>;
}
