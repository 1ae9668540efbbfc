//! Batch-at-a-time record source with adaptive sizing.

use tokio::time::Instant;
use tracing::debug;

use crate::batch::BatchSizeController;
use crate::error::Result;
use crate::fetch::{FetchClient, RetryingFetcher};
use crate::record::RawRecord;

/// Produces one batch of raw records per [`consume`](MessageSource::consume)
/// call, feeding the fetch latency back into its [`BatchSizeController`].
///
/// The source owns its controller and fetcher; `consume` takes `&mut self`,
/// so a source serves exactly one consumption stream. For parallel
/// consumption across partitions, give each worker its own source.
pub struct MessageSource<C> {
    fetcher: RetryingFetcher<C>,
    batch_size: BatchSizeController,
}

impl<C: FetchClient> MessageSource<C> {
    pub fn new(client: C) -> Self {
        Self::with_fetcher(RetryingFetcher::new(client))
    }

    /// Build a source around a fetcher with a non-default retry policy.
    pub fn with_fetcher(fetcher: RetryingFetcher<C>) -> Self {
        Self {
            fetcher,
            batch_size: BatchSizeController::new(),
        }
    }

    /// Fetch the next batch of records.
    ///
    /// The working size starts at `min(1000, max_batch)` and then follows the
    /// latency feedback; passing a smaller `max_batch` than before clamps it.
    /// The elapsed wall-clock time of the fetch (retries included) is fed to
    /// the controller, so the adjusted size takes effect on the next call.
    pub async fn consume(&mut self, max_batch: usize) -> Result<Vec<RawRecord>> {
        self.batch_size.set_max(max_batch);
        let count = self.batch_size.current();

        let start = Instant::now();
        let records = self.fetcher.fetch(count).await?;
        let elapsed = start.elapsed();

        debug!("Fetched {} records in {:?}", records.len(), elapsed);
        self.batch_size.adjust(elapsed);
        Ok(records)
    }

    /// Current target batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size.current()
    }

    /// Access the wrapped fetch client.
    pub fn client(&self) -> &C {
        self.fetcher.client()
    }
}
