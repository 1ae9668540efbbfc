//! Adaptive batch consumption pipeline for Kafka.
//!
//! Pulls batches of records from a set of partitions, sizing each fetch from
//! the latency of the previous one, then decompresses and deserializes every
//! record's payload, skipping malformed entries without aborting the stream.
//!
//! # Pipeline
//!
//! ```text
//! MessageSource → decompress() → deserialize() → DecodedRecord
//! ```
//!
//! Features:
//!
//! - Adaptive Batch Sizing: slow fetches halve the request size, fast fetches grow it
//! - Transient-Error Retry: leader-unavailable fetch errors are retried every 60s, indefinitely
//! - Streaming Decode: per-record decompression and MessagePack decoding, one record in flight
//! - Malformed-Record Tolerance: undecodable records are logged with partition, offset and key, then skipped
//!
//! The decode stages are plain iterator adaptors, so a stage never runs ahead
//! of the downstream consumer. Offset commit policy, partition assignment and
//! consumer identity belong to the surrounding application; the underlying
//! rdkafka consumer stays reachable through [`KafkaConsumer::inner`].

/// Adaptive batch size feedback controller
pub mod batch;
/// rdkafka-backed fetch client
pub mod consumer;
/// Conversion of decoded records into JSON
pub mod convert;
/// Payload decompression stage
pub mod decompress;
/// Payload deserialization stage
pub mod deserialize;
pub mod error;
/// Batch fetching with transient-error retry
pub mod fetch;
pub mod record;
/// High-level scan loop
pub mod scan;
/// Batch-at-a-time record source with adaptive sizing
pub mod source;

pub use batch::BatchSizeController;
pub use consumer::{ConsumerConfig, KafkaConsumer};
pub use convert::{record_to_json, value_to_json};
pub use decompress::{decompress, Codec};
pub use deserialize::{deserialize, TextEncoding};
pub use error::{Error, Result};
pub use fetch::{FetchClient, RetryPolicy, RetryingFetcher};
pub use record::{DecodedRecord, DecompressedRecord, RawRecord};
pub use scan::{run_scan, spawn_scan_task, Config};
pub use source::MessageSource;
