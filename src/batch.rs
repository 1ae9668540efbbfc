//! Adaptive batch sizing.

use std::time::Duration;
use tracing::info;

/// Batch size requested on the first fetch, before any latency feedback
const DEFAULT_BATCH_SIZE: usize = 1000;
/// Fetches slower than this halve the batch size
const SLOW_FETCH: Duration = Duration::from_secs(30);
/// Fetches faster than this grow the batch size
const FAST_FETCH: Duration = Duration::from_secs(5);
/// Step by which fast fetches grow the batch size
const GROWTH_STEP: usize = 100;

/// Feedback controller for the per-fetch record count.
///
/// Fetch latency stands in for broker load: a slow fetch halves the window to
/// reduce per-call latency, a fast fetch grows it to reduce per-record
/// overhead. The size stays within `[1, max_batch]`, which also caps the
/// memory footprint of a single fetch.
///
/// One controller belongs to one consumption stream. Parallel consumers each
/// need their own instance.
#[derive(Debug, Default)]
pub struct BatchSizeController {
    next_batch_size: usize,
    max_batch: usize,
}

impl BatchSizeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current target batch size.
    pub fn current(&self) -> usize {
        self.next_batch_size
    }

    /// Bound the controller by the caller-supplied maximum.
    ///
    /// The first call initializes the size to `min(1000, max_batch)`; later
    /// calls clamp the current size whenever the maximum shrinks below it.
    /// The size never drops below 1.
    pub fn set_max(&mut self, max_batch: usize) {
        self.max_batch = max_batch.max(1);
        if self.next_batch_size == 0 {
            self.set(DEFAULT_BATCH_SIZE.min(self.max_batch));
        } else {
            self.set(self.next_batch_size.min(self.max_batch));
        }
    }

    /// Apply latency feedback from the most recent fetch.
    ///
    /// Only meaningful after [`set_max`](Self::set_max) established the
    /// working size.
    pub fn adjust(&mut self, elapsed: Duration) {
        if elapsed > SLOW_FETCH {
            self.set((self.next_batch_size / 2).max(1));
        } else if elapsed < FAST_FETCH {
            self.set((self.next_batch_size + GROWTH_STEP).min(self.max_batch));
        }
    }

    fn set(&mut self, size: usize) {
        if size != self.next_batch_size {
            self.next_batch_size = size;
            info!("Next batch size adjusted to {size}");
        }
    }
}
