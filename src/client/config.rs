//! Client configuration constants and settings

use std::time::Duration;

/// Root of the SCB table API endpoint hierarchy.
pub const DEFAULT_BASE_URL: &str = "https://api.scb.se/OV0104/v1/doris/sv/ssd";

/// Cells the server returns at most per request.
pub const SERVER_CELL_LIMIT: u64 = 150_000;

/// Default client-side quota on cells per `execute` call. 0 disables the quota.
pub const DEFAULT_SIZE_LIMIT: u64 = 30_000;

/// Fixed delay before re-issuing a request the server rate-limited.
pub const RATE_LIMIT_BACKOFF_MS: u64 = 1000; // 1 second

/// Pause between consecutive partition requests.
/// The server allows a handful of requests per ten-second window per IP.
pub const PARTITION_DELAY_MS: u64 = 1000; // 1 second

/// HTTP connect timeout (seconds) - time to establish TCP connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds) - overall time for the entire request
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the endpoint hierarchy
    pub base_url: String,
    /// Client-side cell quota, 0 disables it
    pub size_limit: u64,
    /// Server hard limit per request
    pub server_limit: u64,
    /// Variable to split oversized queries on; `None` picks the largest
    pub preferred_partition_variable: Option<String>,
    /// Delay before retrying a rate-limited request
    pub rate_limit_backoff: Duration,
    /// Maximum retries of one rate-limited request; `None` retries until it succeeds
    pub max_rate_limit_retries: Option<u32>,
    /// Pause between partition requests
    pub partition_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            size_limit: DEFAULT_SIZE_LIMIT,
            server_limit: SERVER_CELL_LIMIT,
            preferred_partition_variable: None,
            rate_limit_backoff: Duration::from_millis(RATE_LIMIT_BACKOFF_MS),
            max_rate_limit_retries: None,
            partition_delay: Duration::from_millis(PARTITION_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the client-side cell quota (0 disables it)
    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Set the server limit used for partition planning
    pub fn with_server_limit(mut self, server_limit: u64) -> Self {
        self.server_limit = server_limit;
        self
    }

    /// Set the preferred partition variable
    pub fn with_preferred_partition_variable(mut self, code: impl Into<String>) -> Self {
        self.preferred_partition_variable = Some(code.into());
        self
    }

    /// Set the rate-limit backoff
    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    /// Cap rate-limit retries per request
    pub fn with_max_rate_limit_retries(mut self, max_retries: u32) -> Self {
        self.max_rate_limit_retries = Some(max_retries);
        self
    }

    /// Set the pause between partition requests
    pub fn with_partition_delay(mut self, delay: Duration) -> Self {
        self.partition_delay = delay;
        self
    }

    /// Whether `cells` exceeds the client quota
    pub fn exceeds_size_limit(&self, cells: u64) -> bool {
        self.size_limit > 0 && cells > self.size_limit
    }
}

/// Parse a size limit given as text
///
/// Accepts non-negative integers, optionally with `_` separators.
pub fn parse_size_limit(s: &str) -> Result<u64, String> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
    cleaned
        .parse::<u64>()
        .map_err(|_| format!("size limit must be a non-negative integer, got '{s}'"))
}
