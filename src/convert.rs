//! Conversion of decoded records into JSON for downstream consumers.
//!
//! Sinks and log pipelines downstream of the scan generally speak JSON; this
//! module maps decoded MessagePack values onto `serde_json::Value`, encoding
//! raw bytes as base64 text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rmpv::Value;

use crate::error::{Error, Result};
use crate::record::DecodedRecord;

/// Convert a decoded MessagePack value to JSON.
///
/// Binary values are base64 encoded, map keys must be text, and extension
/// values are refused.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value> {
    match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Integer(i) => {
            if let Some(n) = i.as_i64() {
                Ok(serde_json::Value::from(n))
            } else if let Some(n) = i.as_u64() {
                Ok(serde_json::Value::from(n))
            } else {
                Err(Error::UnsupportedValue(format!("integer out of range: {i:?}")))
            }
        }
        Value::F32(f) => Ok(serde_json::Value::from(f64::from(*f))),
        Value::F64(f) => Ok(serde_json::Value::from(*f)),
        Value::String(s) => match s.as_str() {
            Some(text) => Ok(serde_json::Value::from(text)),
            None => Err(Error::UnsupportedValue(
                "string is not valid UTF-8".to_string(),
            )),
        },
        Value::Binary(bytes) => Ok(serde_json::Value::from(STANDARD.encode(bytes))),
        Value::Array(items) => Ok(serde_json::Value::Array(
            items.iter().map(value_to_json).collect::<Result<Vec<_>>>()?,
        )),
        Value::Map(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, value) in entries {
                let key = key.as_str().ok_or_else(|| {
                    Error::UnsupportedValue(format!("non-text map key: {key}"))
                })?;
                object.insert(key.to_string(), value_to_json(value)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        Value::Ext(tag, _) => Err(Error::UnsupportedValue(format!(
            "extension value (type {tag})"
        ))),
    }
}

/// Render a decoded record, metadata included, as a JSON object.
///
/// The key is base64 encoded; tombstones get `"record": null`.
pub fn record_to_json(record: &DecodedRecord) -> Result<serde_json::Value> {
    let mut object = serde_json::Map::new();
    object.insert(
        "partition".to_string(),
        serde_json::Value::from(record.partition),
    );
    object.insert("offset".to_string(), serde_json::Value::from(record.offset));
    if let Some(key) = &record.key {
        object.insert(
            "key".to_string(),
            serde_json::Value::from(STANDARD.encode(key)),
        );
    }
    object.insert(
        "record".to_string(),
        match &record.record {
            Some(value) => value_to_json(value)?,
            None => serde_json::Value::Null,
        },
    );
    Ok(serde_json::Value::Object(object))
}
