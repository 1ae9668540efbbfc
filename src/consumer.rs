//! rdkafka-backed fetch client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer as RdkafkaConsumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message as RdkafkaMessage};

use crate::error::{Error, Result};
use crate::fetch::FetchClient;
use crate::record::RawRecord;

/// How long to wait for further messages once the first of a batch arrived
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);

/// Configuration for the Kafka consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Topic to consume from
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// "earliest" starts from the beginning of the topic when the consumer
    /// group has no committed offsets, "latest" from the end. "earliest" is
    /// preferred for scan use cases to avoid missing records.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Enable auto commit
    ///
    /// Offset commit policy belongs to the surrounding application. Leave
    /// this off and commit through [`KafkaConsumer::inner`], or turn it on
    /// to let librdkafka commit periodically.
    pub enable_auto_commit: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "kafka-scan-consumer".to_string(),
            topic: "".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: "6000".to_string(),
            enable_auto_commit: false,
        }
    }
}

/// Kafka-backed [`FetchClient`].
pub struct KafkaConsumer {
    consumer: StreamConsumer,
}

impl std::fmt::Debug for KafkaConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaConsumer").finish_non_exhaustive()
    }
}

impl KafkaConsumer {
    /// Create a consumer and subscribe it to the configured topic.
    pub fn new(config: &ConsumerConfig) -> Result<Self> {
        if config.topic.is_empty() {
            return Err(Error::InvalidConfig("topic must not be empty".to_string()));
        }

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", config.enable_auto_commit.to_string())
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        Ok(Self { consumer })
    }

    /// Get the underlying consumer (for offset commits and other advanced use)
    pub fn inner(&self) -> &StreamConsumer {
        &self.consumer
    }

    fn to_record(msg: &BorrowedMessage<'_>) -> RawRecord {
        RawRecord {
            partition: msg.partition(),
            offset: msg.offset(),
            key: msg.key().map(Bytes::copy_from_slice),
            payload: msg.payload().map(Bytes::copy_from_slice),
        }
    }
}

#[async_trait]
impl FetchClient for KafkaConsumer {
    /// Block until at least one message is available, then drain up to
    /// `max_records` with a short timeout per message.
    async fn fetch_batch(&self, max_records: usize) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();

        let msg = self.consumer.recv().await?;
        records.push(Self::to_record(&msg));

        while records.len() < max_records {
            match tokio::time::timeout(DRAIN_TIMEOUT, self.consumer.recv()).await {
                Ok(Ok(msg)) => records.push(Self::to_record(&msg)),
                // On timeout or a mid-drain error, return what we have; an
                // error will resurface on the next fetch.
                _ => break,
            }
        }

        Ok(records)
    }
}
