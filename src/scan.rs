//! High-level scan loop: consume, decompress, deserialize, process.

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::consumer::{ConsumerConfig, KafkaConsumer};
use crate::decompress::{decompress, Codec};
use crate::deserialize::{deserialize, TextEncoding};
use crate::record::DecodedRecord;
use crate::source::MessageSource;

/// Configuration for a scan.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(long, value_delimiter = ',', required = true)]
    pub brokers: Vec<String>,
    /// Consumer group ID
    #[clap(long)]
    pub group_id: String,
    /// Topic to consume from
    #[clap(long)]
    pub topic: String,
    /// Upper bound for the adaptive batch size.
    /// The scan starts at min(1000, this) records per fetch and adapts from
    /// there; the bound also caps the memory used by a single fetch.
    #[clap(long, default_value_t = 1000)]
    pub max_batch_size: usize,
    /// Payload compression codec
    #[clap(long, value_enum, default_value_t = Codec::Zlib)]
    pub codec: Codec,
    /// Re-interpret MessagePack binary values as text
    #[clap(long, value_enum)]
    pub encoding: Option<TextEncoding>,
    /// Session timeout in milliseconds
    #[clap(long, default_value = "30000")]
    pub session_timeout_ms: String,
    /// Maximum number of records to process before exiting.
    /// When set, the scan stops as soon as this many records were handed to
    /// the processor instead of waiting for the deadline.
    #[clap(long)]
    pub max_messages: Option<u64>,
}

/// Run a scan until the deadline passes, or `max_messages` records were
/// processed.
///
/// Each decoded record is handed to `processor`; a processor error aborts the
/// scan, as does a decompression failure. The deadline is checked between
/// batches only — a fetch in progress (or a retry sleep) runs to completion
/// before the stop is observed.
pub async fn run_scan<F, Fut>(config: Config, deadline: DateTime<Utc>, processor: F) -> Result<u64>
where
    F: Fn(DecodedRecord) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    info!(
        "Starting scan of topic {} (deadline in {} seconds)",
        config.topic,
        deadline.signed_duration_since(Utc::now()).num_seconds()
    );

    let consumer_config = ConsumerConfig {
        brokers: config.brokers.join(","),
        group_id: config.group_id.clone(),
        topic: config.topic.clone(),
        session_timeout_ms: config.session_timeout_ms.clone(),
        ..Default::default()
    };
    let consumer = KafkaConsumer::new(&consumer_config)?;
    let mut source = MessageSource::new(consumer);

    let mut processed = 0u64;
    'scan: while Utc::now() < deadline {
        let batch = source.consume(config.max_batch_size).await?;
        debug!("Consumed batch of {} records", batch.len());

        let records = deserialize(decompress(config.codec, batch), config.encoding);
        for record in records {
            processor(record?).await?;
            processed += 1;
            if processed % 100 == 0 {
                info!("Processed {processed} records total");
            }
            if let Some(max) = config.max_messages {
                if processed >= max {
                    info!("Reached max_messages limit ({max}), stopping scan");
                    break 'scan;
                }
            }
        }
    }

    info!(
        "Scan completed: processed {} records from topic {}",
        processed, config.topic
    );
    Ok(processed)
}

/// Spawn [`run_scan`] on its own task.
pub fn spawn_scan_task<F, Fut>(
    config: Config,
    deadline: DateTime<Utc>,
    processor: F,
) -> JoinHandle<Result<u64>>
where
    F: Fn(DecodedRecord) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(run_scan(config, deadline, processor))
}
