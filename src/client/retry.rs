//! Rate-limit retry messages
//!
//! The only condition the client retries on its own is HTTP 429. These types
//! carry the context of one retry so log lines read the same everywhere.

use std::time::Duration;

/// Context for one rate-limit retry
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current retry number (1-based)
    pub attempt: u32,
    /// Configured cap, `None` when retries are unbounded
    pub max_attempts: Option<u32>,
    /// Delay before the next attempt
    pub backoff_duration: Duration,
    /// Position of the request in its partition plan (1-based) and plan size
    pub partition: (usize, usize),
    /// Table URL being queried
    pub endpoint: String,
}

impl RetryContext {
    /// Convenience constructor used by the executor
    pub fn new(
        attempt: u32,
        max_attempts: Option<u32>,
        backoff_duration: Duration,
        partition: (usize, usize),
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            backoff_duration,
            partition,
            endpoint: endpoint.into(),
        }
    }

    /// Whether another retry is allowed after this one
    pub fn is_exhausted(&self) -> bool {
        self.max_attempts.is_some_and(|max| self.attempt > max)
    }

    fn attempts_display(&self) -> String {
        match self.max_attempts {
            Some(max) => format!("{}/{}", self.attempt, max),
            None => format!("{}/unbounded", self.attempt),
        }
    }

    /// Standard retry message
    pub fn format_retry(&self) -> String {
        let (index, total) = self.partition;
        format!(
            "Rate limited (retry {}) on request {}/{} - waiting {:.1} seconds...",
            self.attempts_display(),
            index,
            total,
            self.backoff_duration.as_secs_f64()
        )
    }

    /// Final failure summary once the cap is reached
    pub fn format_failure(&self) -> String {
        let (index, total) = self.partition;
        let lines = [
            format!(
                "[FAILED] Request {}/{} still rate limited after {} retries",
                index,
                total,
                self.attempt.saturating_sub(1)
            ),
            format!("  Endpoint: {}", self.endpoint),
            "  Suggestions:".to_string(),
            "    - Wait a few seconds before issuing more requests".to_string(),
            "    - Raise the retry cap or the backoff delay".to_string(),
        ];
        lines.join("\n")
    }
}
