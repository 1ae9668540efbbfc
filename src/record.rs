//! Record types for the consumption pipeline.
//!
//! Each stage yields its own record type, so the type signature of a stage
//! says what has already happened to the payload: [`RawRecord`] comes off the
//! wire, [`DecompressedRecord`] carries an inflated payload, and
//! [`DecodedRecord`] carries the structured mapping decoded from it.
//! Records move by value; a stage owns only the record it currently holds.

use bytes::Bytes;
use rmpv::Value;

/// A record as fetched from a Kafka partition.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Partition the record was read from
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Record key (if any)
    pub key: Option<Bytes>,
    /// Compressed payload; absent for tombstones
    pub payload: Option<Bytes>,
}

/// A record whose payload has been decompressed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompressedRecord {
    /// Partition the record was read from
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Record key (if any)
    pub key: Option<Bytes>,
    /// Decompressed payload; absent for tombstones
    pub payload: Option<Bytes>,
}

/// A fully decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// Partition the record was read from
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Record key (if any)
    pub key: Option<Bytes>,
    /// Decoded payload, always a MessagePack map; `None` marks a tombstone
    pub record: Option<Value>,
}
