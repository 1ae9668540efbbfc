//! End-to-end pipeline tests against a scripted in-memory fetch client.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use rmpv::Value;

use kafka_scan::{
    decompress, deserialize, Codec, Error, FetchClient, MessageSource, RawRecord, Result,
};

/// FetchClient scripted with a queue of per-call outcomes.
struct ScriptedClient {
    outcomes: Mutex<VecDeque<Result<Vec<RawRecord>>>>,
}

impl ScriptedClient {
    fn new(outcomes: Vec<Result<Vec<RawRecord>>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl FetchClient for ScriptedClient {
    async fn fetch_batch(&self, _max_records: usize) -> Result<Vec<RawRecord>> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetch_batch called more often than scripted")
    }
}

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn msgpack(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value).unwrap();
    buf
}

fn raw(partition: i32, offset: i64, payload: Option<Vec<u8>>) -> RawRecord {
    RawRecord {
        partition,
        offset,
        key: Some(Bytes::from(format!("key-{offset}").into_bytes())),
        payload: payload.map(Bytes::from),
    }
}

fn sample_map(id: i64) -> Value {
    Value::Map(vec![
        (Value::String("id".into()), Value::from(id)),
        (
            Value::String("state".into()),
            Value::String("published".into()),
        ),
    ])
}

#[tokio::test]
async fn test_round_trip_recovers_original_mapping() {
    let payload = zlib_compress(&msgpack(&sample_map(42)));
    let client = ScriptedClient::new(vec![Ok(vec![raw(1, 7, Some(payload))])]);
    let mut source = MessageSource::new(client);

    let batch = source.consume(1000).await.unwrap();
    let records: Vec<_> = deserialize(decompress(Codec::Zlib, batch), None)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].partition, 1);
    assert_eq!(records[0].offset, 7);
    assert_eq!(records[0].key.as_deref(), Some(&b"key-7"[..]));
    assert_eq!(records[0].record, Some(sample_map(42)));
}

#[tokio::test]
async fn test_malformed_record_is_dropped_and_stream_continues() {
    let batch = vec![
        raw(0, 1, Some(zlib_compress(&msgpack(&sample_map(1))))),
        // zlib-valid, but the inflated bytes are not MessagePack
        raw(0, 2, Some(zlib_compress(b"\x81"))),
        raw(0, 3, Some(zlib_compress(&msgpack(&sample_map(3))))),
    ];
    let client = ScriptedClient::new(vec![Ok(batch)]);
    let mut source = MessageSource::new(client);

    let batch = source.consume(1000).await.unwrap();
    let records: Vec<_> = deserialize(decompress(Codec::Zlib, batch), None)
        .collect::<Result<_>>()
        .unwrap();

    let offsets: Vec<_> = records.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![1, 3]);
}

#[tokio::test]
async fn test_batch_of_only_malformed_records_yields_nothing() {
    let batch = vec![raw(0, 1, Some(zlib_compress(b"\x81")))];
    let client = ScriptedClient::new(vec![Ok(batch)]);
    let mut source = MessageSource::new(client);

    let batch = source.consume(1000).await.unwrap();
    let records: Vec<_> = deserialize(decompress(Codec::Zlib, batch), None)
        .collect::<Result<_>>()
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_non_map_record_is_dropped() {
    let list = Value::Array(vec![Value::from(1)]);
    let batch = vec![
        raw(0, 1, Some(zlib_compress(&msgpack(&list)))),
        raw(0, 2, Some(zlib_compress(&msgpack(&sample_map(2))))),
    ];
    let client = ScriptedClient::new(vec![Ok(batch)]);
    let mut source = MessageSource::new(client);

    let batch = source.consume(1000).await.unwrap();
    let records: Vec<_> = deserialize(decompress(Codec::Zlib, batch), None)
        .collect::<Result<_>>()
        .unwrap();

    let offsets: Vec<_> = records.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![2]);
}

#[tokio::test]
async fn test_tombstone_passes_through_whole_pipeline() {
    let client = ScriptedClient::new(vec![Ok(vec![raw(2, 5, None)])]);
    let mut source = MessageSource::new(client);

    let batch = source.consume(1000).await.unwrap();
    let records: Vec<_> = deserialize(decompress(Codec::Zlib, batch), None)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].partition, 2);
    assert_eq!(records[0].offset, 5);
    assert!(records[0].record.is_none());
}

#[tokio::test]
async fn test_decompression_failure_aborts_the_run() {
    let batch = vec![
        raw(0, 1, Some(zlib_compress(&msgpack(&sample_map(1))))),
        raw(0, 2, Some(b"not compressed".to_vec())),
        raw(0, 3, Some(zlib_compress(&msgpack(&sample_map(3))))),
    ];
    let client = ScriptedClient::new(vec![Ok(batch)]);
    let mut source = MessageSource::new(client);

    let batch = source.consume(1000).await.unwrap();
    let mut records = deserialize(decompress(Codec::Zlib, batch), None);

    assert_eq!(records.next().unwrap().unwrap().offset, 1);
    assert!(matches!(
        records.next().unwrap().unwrap_err(),
        Error::Decompress(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_transient_fetch_error_recovers_and_decodes() {
    let payload = zlib_compress(&msgpack(&sample_map(9)));
    let client = ScriptedClient::new(vec![
        Err(Error::Kafka(KafkaError::MessageConsumption(
            RDKafkaErrorCode::LeaderNotAvailable,
        ))),
        Ok(vec![raw(0, 9, Some(payload))]),
    ]);
    let mut source = MessageSource::new(client);

    let start = tokio::time::Instant::now();
    let batch = source.consume(1000).await.unwrap();
    // The retry slept through the fixed 60s backoff before succeeding.
    assert_eq!(start.elapsed().as_secs(), 60);

    let records: Vec<_> = deserialize(decompress(Codec::Zlib, batch), None)
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(records[0].record, Some(sample_map(9)));
}
