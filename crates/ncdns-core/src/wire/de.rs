//! Lenient serde helpers for normalized payloads
//!
//! The normalizer coerces numeric-looking and boolean-looking scalars, so a
//! field that is conceptually text (a host id, a TXT value of `"123"`) may
//! arrive as a number. These helpers accept any scalar where text is wanted,
//! and text where a number or bool is wanted.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use super::xml::TEXT_KEY;

/// Render a normalized scalar (or the text of an element) as a string
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) if map.is_empty() => Some(String::new()),
        Value::Object(map) => map.get(TEXT_KEY).and_then(value_to_string),
        _ => None,
    }
}

fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "enabled" => Some(true),
            "false" | "no" | "disabled" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        _ => None,
    }
}

/// Any scalar as `String`
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(&value).ok_or_else(|| de::Error::custom(format!("expected text, got {value}")))
}

/// Any scalar as `Option<String>`; null or empty becomes `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let text = value_to_string(&value)
        .ok_or_else(|| de::Error::custom(format!("expected text, got {value}")))?;
    Ok(Some(text).filter(|s| !s.is_empty()))
}

/// Number or numeric text as `Option<u32>`
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        _ => value_to_u32(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected an unsigned integer, got {value}"))),
    }
}

/// Bool or boolean-looking text as `bool`
pub fn bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_bool(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a boolean, got {value}")))
}

/// Sequence of scalars as `Vec<String>`
pub fn string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(|v| {
            value_to_string(v)
                .ok_or_else(|| de::Error::custom(format!("expected text, got {v}")))
        })
        .collect()
}
