//! Payload decompression stage.

use std::io::Read;

use bytes::Bytes;
use clap::ValueEnum;
use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};
use crate::record::{DecompressedRecord, RawRecord};

/// Payload compression codecs supported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Codec {
    /// zlib (RFC 1950) deflate stream
    #[default]
    Zlib,
    /// gzip (RFC 1952) wrapper around deflate
    Gzip,
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Codec::Zlib => f.write_str("zlib"),
            Codec::Gzip => f.write_str("gzip"),
        }
    }
}

impl Codec {
    /// Decompress `data` with this codec.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Codec::Zlib => ZlibDecoder::new(data).read_to_end(&mut out),
            Codec::Gzip => GzDecoder::new(data).read_to_end(&mut out),
        }
        .map_err(Error::Decompress)?;
        Ok(out)
    }
}

/// Decompress each record's payload.
///
/// Records without a payload (tombstones) pass through unchanged. A payload
/// that fails to decompress yields an `Err` item, which aborts the pipeline
/// run: corruption at this layer points at a mismatched codec or a corrupt
/// stream, not a single bad message.
pub fn decompress<I>(codec: Codec, records: I) -> impl Iterator<Item = Result<DecompressedRecord>>
where
    I: IntoIterator<Item = RawRecord>,
{
    records.into_iter().map(move |record| {
        let payload = match record.payload {
            Some(compressed) => Some(Bytes::from(codec.decompress(&compressed)?)),
            None => None,
        };
        Ok(DecompressedRecord {
            partition: record.partition,
            offset: record.offset,
            key: record.key,
            payload,
        })
    })
}
