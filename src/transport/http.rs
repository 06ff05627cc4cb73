//! reqwest-backed transport
//!
//! All `HttpTransport` instances share one connection pool, configured with
//! explicit timeouts so a stalled connection cannot hang a request forever.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client::config::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS};
use crate::transport::{RawResponse, Transport, TransportError, TransportResult};

static SHARED_HTTP_CLIENT: OnceCell<Arc<Client>> = OnceCell::new();

/// Get the shared HTTP client, building it on first use
///
/// Returns a clone of the Arc, which is cheap (just increments ref count)
pub fn shared_http_client() -> TransportResult<Arc<Client>> {
    SHARED_HTTP_CLIENT
        .get_or_try_init(|| {
            Client::builder()
                .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
                .build()
                .map(Arc::new)
                .map_err(|e| {
                    TransportError::Build(format!(
                        "{e}. Check system TLS configuration."
                    ))
                })
        })
        .cloned()
}

/// Transport over HTTP using reqwest
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<Client>,
}

impl HttpTransport {
    /// Create a transport on the shared HTTP client
    pub fn new() -> TransportResult<Self> {
        Ok(Self {
            client: shared_http_client()?,
        })
    }

    /// Create a transport on a caller-supplied client (custom headers, proxies)
    pub fn with_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    async fn into_raw(response: reqwest::Response) -> TransportResult<RawResponse> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {e}")))?;
        debug!(status, bytes = body.len(), "Response received");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> TransportResult<RawResponse> {
        debug!("Making GET request to: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::into_raw(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> TransportResult<RawResponse> {
        debug!("Making POST request to: {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::into_raw(response).await
    }
}
