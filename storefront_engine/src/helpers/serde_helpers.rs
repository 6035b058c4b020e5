//! Lenient deserializers for backend payloads.
//!
//! The backend is not consistent about amount and id encodings: the same field can arrive as a number, a numeric
//! string, an empty string or `null` depending on the endpoint and the age of the record. These helpers collapse
//! all of those into `Option`s so the domain types never carry raw JSON.
use log::*;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use shop_common::Money;

use crate::store_types::{AmountField, OrderStatus};

/// Numbers and numeric strings become `Some`; `null`, blank strings and anything unparseable become `None`.
pub fn loose_amount<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| amount_from_value(&v)))
}

/// Like [`loose_amount`], but keeps a field that was sent without a usable amount apart from one that was not sent.
pub fn amount_field<'de, D>(deserializer: D) -> Result<AmountField, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => AmountField::Absent,
        Some(v) => amount_from_value(&v).map(AmountField::Amount).unwrap_or(AmountField::Unusable),
    })
}

/// Like [`loose_amount`], but an absent amount is zero.
pub fn amount_or_zero<'de, D>(deserializer: D) -> Result<Money, D::Error>
where D: Deserializer<'de> {
    Ok(loose_amount(deserializer)?.unwrap_or_default())
}

pub fn amount_from_value(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Money::from(i))
            } else {
                n.as_f64().and_then(|f| Money::try_from(f).ok())
            }
        },
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s
            .parse()
            .map_err(|e| debug!("Ignoring unparseable amount. {e}"))
            .ok(),
        _ => None,
    }
}

/// Integers, integral floats and numeric strings become `Some`.
pub fn loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| int_from_value(&v)))
}

pub fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings are kept when non-blank. Other JSON types are dropped.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

pub fn loose_status<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
where D: Deserializer<'de> {
    Ok(loose_string(deserializer)?.map(OrderStatus::from))
}

/// A JSON array of `T`. A missing or non-array value is an empty list, and elements that don't match `T` are
/// skipped.
pub fn loose_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(list_from_value).unwrap_or_default())
}

pub fn list_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value(entry).map_err(|e| warn!("Skipping malformed list entry. {e}")).ok()
            })
            .collect(),
        _ => Vec::new(),
    }
}
