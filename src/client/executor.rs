//! Query execution with partitioning and rate-limit retries
//!
//! Requests are issued one at a time, strictly in plan order. Results come
//! back in the same order so callers can line them up with the original value
//! sequence of the splitting variable.

use tracing::{debug, error, info, warn};

use crate::client::{ClientError, ClientResult, RetryContext, StatsClient};
use crate::decode::{DecodedResult, ResponseDecoder};
use crate::partition::Partitioner;
use crate::query::{estimate, QueryDocument};
use crate::transport::RawResponse;

impl StatsClient {
    /// Fetch the data selected by `query`
    ///
    /// 1. Fails with `QuotaExceeded` before any request if the estimate exceeds
    ///    the client quota (when the quota is non-zero)
    /// 2. Sends a single request if the estimate is below the server limit
    /// 3. Otherwise splits the query and sends one request per partition
    ///
    /// # Returns
    /// One decoded result per request, in the order the requests were issued
    pub async fn execute(&self, query: &QueryDocument) -> ClientResult<Vec<DecodedResult>> {
        let cells = estimate(query);

        if self.config.exceeds_size_limit(cells) {
            return Err(ClientError::QuotaExceeded {
                estimate: cells,
                limit: self.config.size_limit,
            });
        }

        if cells < self.config.server_limit {
            debug!(cells, "Query fits in a single request");
            let response = self.post_with_retry(query, (1, 1)).await?;
            let result = ResponseDecoder::decode(&response, query.format())?;
            return Ok(vec![result]);
        }

        let partitioner = Partitioner::new(
            self.config.server_limit,
            self.config.preferred_partition_variable.clone(),
        );
        let plan = partitioner.plan(query)?;
        let sub_queries = plan.sub_documents(query)?;
        let total = sub_queries.len();

        let mut results = Vec::with_capacity(total);
        for (index, sub_query) in sub_queries.iter().enumerate() {
            if index > 0 && !self.config.partition_delay.is_zero() {
                tokio::time::sleep(self.config.partition_delay).await;
            }

            debug!(
                partition = index + 1,
                total,
                cells = estimate(sub_query),
                "Issuing partition request"
            );
            let response = self.post_with_retry(sub_query, (index + 1, total)).await?;
            results.push(ResponseDecoder::decode(&response, sub_query.format())?);
        }

        info!(
            requests = total,
            variable = %plan.variable_code,
            "Partitioned query completed"
        );
        Ok(results)
    }

    /// POST one document, re-issuing it after a fixed delay while the server rate limits
    async fn post_with_retry(
        &self,
        query: &QueryDocument,
        partition: (usize, usize),
    ) -> ClientResult<RawResponse> {
        let body = query.to_json();
        let mut retries = 0u32;

        loop {
            let response = self.transport.post(&self.data_url, &body).await?;

            if response.is_rate_limited() {
                retries += 1;
                let ctx = RetryContext::new(
                    retries,
                    self.config.max_rate_limit_retries,
                    self.config.rate_limit_backoff,
                    partition,
                    self.data_url.as_str(),
                );

                if ctx.is_exhausted() {
                    error!("{}", ctx.format_failure());
                    return Err(ClientError::RateLimited {
                        retries: retries - 1,
                        url: self.data_url.clone(),
                    });
                }

                warn!("{}", ctx.format_retry());
                tokio::time::sleep(self.config.rate_limit_backoff).await;
                continue;
            }

            if !response.is_success() {
                return Err(ClientError::UnexpectedStatus {
                    status: response.status,
                    url: self.data_url.clone(),
                });
            }

            if retries > 0 {
                info!(retries, "Request succeeded after rate limiting");
            }
            return Ok(response);
        }
    }
}
