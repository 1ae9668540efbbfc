//! Payload deserialization stage.

use clap::ValueEnum;
use rmpv::Value;
use tracing::{error, info};

use crate::error::Result;
use crate::record::{DecodedRecord, DecompressedRecord};

/// Optional re-interpretation of MessagePack binary values as text.
///
/// Producers predating the MessagePack str/bin split ship text as raw bytes;
/// the hint controls how those surface in the decoded mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextEncoding {
    /// Convert binary values that are valid UTF-8, leave the rest as bytes
    Utf8,
    /// Convert all binary values, replacing invalid sequences
    Utf8Lossy,
}

/// Deserialize each record's payload into a structured mapping.
///
/// Records whose payload fails to decode, or decodes to something other than
/// a map, are logged and skipped; the stream position is kept and decoding
/// continues with the next record. Records without a payload pass through as
/// tombstones (`record: None`). `Err` items from the upstream stage are
/// passed along untouched.
pub fn deserialize<I>(
    records: I,
    encoding: Option<TextEncoding>,
) -> impl Iterator<Item = Result<DecodedRecord>>
where
    I: IntoIterator<Item = Result<DecompressedRecord>>,
{
    records.into_iter().filter_map(move |item| {
        let record = match item {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };

        let payload = match record.payload {
            Some(payload) => payload,
            None => {
                return Some(Ok(DecodedRecord {
                    partition: record.partition,
                    offset: record.offset,
                    key: record.key,
                    record: None,
                }))
            }
        };

        match rmpv::decode::read_value(&mut payload.as_ref()) {
            Ok(value) => {
                let value = match encoding {
                    Some(encoding) => reinterpret_text(value, encoding),
                    None => value,
                };
                if value.is_map() {
                    Some(Ok(DecodedRecord {
                        partition: record.partition,
                        offset: record.offset,
                        key: record.key,
                        record: Some(value),
                    }))
                } else {
                    info!(
                        "Record at {}:{} (key: {:?}) has wrong type, skipping",
                        record.partition, record.offset, record.key
                    );
                    None
                }
            }
            Err(e) => {
                error!(
                    "Error unpacking record at {}:{} (key: {:?}): {e}",
                    record.partition, record.offset, record.key
                );
                None
            }
        }
    })
}

/// Convert binary values (recursively, map keys included) to text per the hint.
fn reinterpret_text(value: Value, encoding: TextEncoding) -> Value {
    match value {
        Value::Binary(bytes) => match encoding {
            TextEncoding::Utf8 => match String::from_utf8(bytes) {
                Ok(text) => Value::String(text.into()),
                Err(e) => Value::Binary(e.into_bytes()),
            },
            TextEncoding::Utf8Lossy => {
                Value::String(String::from_utf8_lossy(&bytes).into_owned().into())
            }
        },
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| reinterpret_text(item, encoding))
                .collect(),
        ),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| {
                    (
                        reinterpret_text(key, encoding),
                        reinterpret_text(value, encoding),
                    )
                })
                .collect(),
        ),
        other => other,
    }
}
