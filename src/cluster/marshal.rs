//! Value Marshalling
//!
//! Converts between host values (`serde_json::Value`) and the cluster's native
//! value representation. Both directions fail with `MarshallingError` on shapes
//! the other side cannot represent.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// The cluster-side representation of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Vector(Vec<NativeValue>),
    Object(BTreeMap<String, NativeValue>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshallingError {
    #[error("Unable to marshal number {0}: it does not fit in a signed 64-bit integer")]
    UnsupportedNumber(String),
    #[error("Unable to marshal a non-finite double")]
    NonFiniteDouble,
}

impl NativeValue {
    /// The key used to route this value when it appears in a filter.
    pub fn routing_key(&self) -> String {
        match self {
            NativeValue::String(s) => s.clone(),
            NativeValue::Int64(i) => i.to_string(),
            NativeValue::Boolean(b) => b.to_string(),
            other => format!("{:?}", other),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Int64(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        NativeValue::String(value.to_string())
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        NativeValue::Int64(value)
    }
}

/// Host value -> native value.
pub fn to_native(value: &Value) -> Result<NativeValue, MarshallingError> {
    let native = match value {
        Value::Null => NativeValue::Null,
        Value::Bool(b) => NativeValue::Boolean(*b),
        Value::Number(n) => number_to_native(n)?,
        Value::String(s) => NativeValue::String(s.clone()),
        Value::Array(items) => NativeValue::Vector(
            items
                .iter()
                .map(to_native)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Object(map) => {
            let mut object = BTreeMap::new();
            for (key, value) in map {
                object.insert(key.clone(), to_native(value)?);
            }
            NativeValue::Object(object)
        }
    };

    Ok(native)
}

fn number_to_native(n: &Number) -> Result<NativeValue, MarshallingError> {
    if let Some(i) = n.as_i64() {
        return Ok(NativeValue::Int64(i));
    }

    // u64 values above i64::MAX have no native counterpart
    if n.is_u64() {
        return Err(MarshallingError::UnsupportedNumber(n.to_string()));
    }

    n.as_f64()
        .map(NativeValue::Double)
        .ok_or_else(|| MarshallingError::UnsupportedNumber(n.to_string()))
}

/// Native value -> host value.
pub fn to_host(value: &NativeValue) -> Result<Value, MarshallingError> {
    let host = match value {
        NativeValue::Null => Value::Null,
        NativeValue::Boolean(b) => Value::Bool(*b),
        NativeValue::Int64(i) => Value::Number(Number::from(*i)),
        NativeValue::Double(d) => Number::from_f64(*d)
            .map(Value::Number)
            .ok_or(MarshallingError::NonFiniteDouble)?,
        NativeValue::String(s) => Value::String(s.clone()),
        NativeValue::Vector(items) => Value::Array(
            items
                .iter()
                .map(to_host)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        NativeValue::Object(object) => {
            let mut map = Map::new();
            for (key, value) in object {
                map.insert(key.clone(), to_host(value)?);
            }
            Value::Object(map)
        }
    };

    Ok(host)
}
