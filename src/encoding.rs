//! Text encoding of the structured columns (`items_json`, `meta_json`).
//!
//! Both columns hold a versioned envelope, `{"v": 1, "items": [...]}` and
//! `{"v": 1, "meta": ...}`. Rows written before the envelope existed hold the
//! bare value and are decoded as version 0.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::OrderItem;

pub const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("malformed stored JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u64),
}

#[derive(Serialize)]
struct ItemsEnvelopeRef<'a> {
    v: u64,
    items: &'a [OrderItem],
}

#[derive(Serialize)]
struct MetaEnvelopeRef<'a> {
    v: u64,
    meta: &'a Value,
}

#[derive(Deserialize)]
struct LegacyItem {
    name: String,
    price: f64,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

pub fn encode_items(items: &[OrderItem]) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(&ItemsEnvelopeRef {
        v: SCHEMA_VERSION,
        items,
    })?)
}

pub fn decode_items(text: &str) -> Result<Vec<OrderItem>, EncodingError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(_) => {
            let legacy: Vec<LegacyItem> = serde_json::from_value(value)?;
            Ok(legacy
                .into_iter()
                .map(|item| OrderItem {
                    name: item.name,
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect())
        }
        Value::Object(mut envelope) => {
            check_version(envelope.get("v"))?;
            let items = envelope.remove("items").unwrap_or(Value::Null);
            Ok(serde_json::from_value(items)?)
        }
        other => Err(EncodingError::Json(serde::de::Error::custom(format!(
            "expected an items envelope, found {}",
            other
        )))),
    }
}

pub fn encode_meta(meta: &Value) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(&MetaEnvelopeRef {
        v: SCHEMA_VERSION,
        meta,
    })?)
}

pub fn decode_meta(text: &str) -> Result<Value, EncodingError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Object(mut envelope)
            if envelope.len() == 2
                && envelope.contains_key("v")
                && envelope.contains_key("meta") =>
        {
            check_version(envelope.get("v"))?;
            Ok(envelope.remove("meta").unwrap_or(Value::Null))
        }
        legacy => Ok(legacy),
    }
}

fn check_version(v: Option<&Value>) -> Result<(), EncodingError> {
    match v.and_then(Value::as_u64) {
        Some(SCHEMA_VERSION) => Ok(()),
        Some(other) => Err(EncodingError::UnsupportedVersion(other)),
        None => Err(EncodingError::Json(serde::de::Error::custom(
            "envelope is missing a numeric `v`",
        ))),
    }
}
