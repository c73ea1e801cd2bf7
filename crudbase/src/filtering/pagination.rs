use super::query::SortDirection;
use crate::errors::CrudError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sea_orm::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

/// Applies the default and enforces `1..=MAX_LIMIT`.
///
/// # Errors
///
/// `InvalidFilter` when the limit is zero or above `MAX_LIMIT`.
pub fn effective_limit(limit: Option<u64>) -> Result<u64, CrudError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(CrudError::invalid_filter(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {n}"
        ))),
    }
}

/// Position after the last row of a page. `key` is null when that row had
/// no value in the sort column.
///
/// Serialized as compact JSON and then URL-safe base64 so callers treat it
/// as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "f")]
    pub field: String,
    #[serde(rename = "d")]
    pub direction: SortDirection,
    #[serde(rename = "k")]
    pub key: serde_json::Value,
    #[serde(rename = "i")]
    pub id: serde_json::Value,
}

impl Cursor {
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and JSON values cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// # Errors
    ///
    /// `InvalidFilter` when the token is not one this crate produced.
    pub fn decode(token: &str) -> Result<Self, CrudError> {
        let malformed = || CrudError::invalid_filter("malformed cursor");
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| malformed())?;
        let cursor: Self = serde_json::from_slice(&bytes).map_err(|_| malformed())?;
        if cursor.id.is_null() {
            return Err(malformed());
        }
        Ok(cursor)
    }

    /// Rejects a cursor that was produced under a different ordering.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` on any mismatch.
    pub fn check_sort(&self, field: &str, direction: SortDirection) -> Result<(), CrudError> {
        if self.field == field && self.direction == direction {
            Ok(())
        } else {
            Err(CrudError::invalid_filter(format!(
                "cursor was issued for sort '{}' {:?}, query sorts by '{field}' {direction:?}",
                self.field, self.direction
            )))
        }
    }
}

/// JSON form of a store value for embedding in a cursor. `None` for values
/// with no stable JSON representation.
#[must_use]
pub fn value_to_json(value: &Value) -> Option<serde_json::Value> {
    let json = match value {
        Value::Bool(Some(v)) => json!(v),
        Value::TinyInt(Some(v)) => json!(v),
        Value::SmallInt(Some(v)) => json!(v),
        Value::Int(Some(v)) => json!(v),
        Value::BigInt(Some(v)) => json!(v),
        Value::TinyUnsigned(Some(v)) => json!(v),
        Value::SmallUnsigned(Some(v)) => json!(v),
        Value::Unsigned(Some(v)) => json!(v),
        Value::BigUnsigned(Some(v)) => json!(v),
        Value::Float(Some(v)) => json!(v),
        Value::Double(Some(v)) => json!(v),
        Value::String(Some(v)) => json!(v.as_str()),
        Value::Char(Some(v)) => json!(v.to_string()),
        Value::Uuid(Some(v)) => json!(v.to_string()),
        Value::ChronoDateTimeUtc(Some(v)) => json!(v.to_rfc3339()),
        Value::ChronoDateTimeWithTimeZone(Some(v)) => json!(v.to_rfc3339()),
        Value::ChronoDateTime(Some(v)) => json!(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::ChronoDate(Some(v)) => json!(v.format("%Y-%m-%d").to_string()),
        Value::ChronoTime(Some(v)) => json!(v.format("%H:%M:%S%.f").to_string()),
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Char(None)
        | Value::Uuid(None)
        | Value::ChronoDateTimeUtc(None)
        | Value::ChronoDateTimeWithTimeZone(None)
        | Value::ChronoDateTime(None)
        | Value::ChronoDate(None)
        | Value::ChronoTime(None) => serde_json::Value::Null,
        _ => return None,
    };
    Some(json)
}
