//! Batch fetching with transient-error retry.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{Error, Result};
use crate::record::RawRecord;

/// Fixed delay between retries of a transiently failed fetch
const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Narrow interface to the queue client's batch-fetch primitive.
///
/// Implementations return up to `max_records` records per call and surface
/// leader-unavailable conditions as errors for which
/// [`Error::is_transient_topology`] holds, so the retry layer can tell them
/// apart from fatal failures.
#[async_trait]
pub trait FetchClient {
    /// Fetch up to `max_records` records.
    async fn fetch_batch(&self, max_records: usize) -> Result<Vec<RawRecord>>;
}

/// Which errors to retry, and how long to wait in between.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub retryable: fn(&Error) -> bool,
}

impl Default for RetryPolicy {
    /// Retry transient topology errors every 60 seconds, indefinitely.
    fn default() -> Self {
        Self {
            delay: RETRY_DELAY,
            retryable: Error::is_transient_topology,
        }
    }
}

/// Wraps a [`FetchClient`] with a fixed-delay retry loop.
///
/// There is no attempt cap: a persistently failing broker keeps the call
/// blocked, sleeping between attempts, rather than failing the stream. Errors
/// the policy does not match propagate immediately.
pub struct RetryingFetcher<C> {
    client: C,
    policy: RetryPolicy,
}

impl<C: FetchClient> RetryingFetcher<C> {
    pub fn new(client: C) -> Self {
        Self::with_policy(client, RetryPolicy::default())
    }

    pub fn with_policy(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetch up to `count` records, retrying per the policy.
    pub async fn fetch(&self, count: usize) -> Result<Vec<RawRecord>> {
        loop {
            match self.client.fetch_batch(count).await {
                Err(e) if (self.policy.retryable)(&e) => {
                    warn!(
                        "Retrying fetch in {}s after transient error: {e}",
                        self.policy.delay.as_secs()
                    );
                    sleep(self.policy.delay).await;
                }
                other => return other,
            }
        }
    }

    /// Get the wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }
}
