//! YANG data type definitions and conversions

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{NetconfError, Result};

/// Represents YANG leaf types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YangType {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64,
    Binary,
    Boolean,
    Empty,
    Identityref,
    Leafref,
    Bits,
    /// Enumeration with name-to-value mapping
    Enumeration(HashMap<String, i64>),
    /// Union of multiple types
    Union(Vec<YangType>),
    /// Unknown/unrecognized type
    Unknown(String),
}

impl YangType {
    /// Parse a YANG type from a schema file "type" field
    pub fn from_schema_type(type_value: &Value) -> Self {
        match type_value {
            Value::String(s) => Self::from_string(s),
            Value::Object(map) => {
                // Enumeration: {"value": "name", ...}
                let enum_map: HashMap<String, i64> = map
                    .iter()
                    .filter_map(|(k, v)| {
                        v.as_str()
                            .map(|name| (name.to_string(), k.parse().unwrap_or(0)))
                    })
                    .collect();
                YangType::Enumeration(enum_map)
            }
            Value::Array(arr) => {
                let types: Vec<YangType> = arr.iter().map(Self::from_schema_type).collect();
                YangType::Union(types)
            }
            _ => YangType::Unknown("invalid".to_string()),
        }
    }

    fn from_string(s: &str) -> Self {
        match s {
            "string" => YangType::String,
            "int8" => YangType::Int8,
            "int16" => YangType::Int16,
            "int32" => YangType::Int32,
            "int64" => YangType::Int64,
            "uint8" => YangType::Uint8,
            "uint16" => YangType::Uint16,
            "uint32" => YangType::Uint32,
            "uint64" => YangType::Uint64,
            "decimal64" => YangType::Decimal64,
            "binary" => YangType::Binary,
            "boolean" => YangType::Boolean,
            "empty" => YangType::Empty,
            "identityref" => YangType::Identityref,
            "leafref" => YangType::Leafref,
            "bits" => YangType::Bits,
            other => YangType::Unknown(other.to_string()),
        }
    }

    fn signed_range(&self) -> Option<(i64, i64)> {
        match self {
            YangType::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
            YangType::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
            YangType::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            YangType::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    fn unsigned_max(&self) -> Option<u64> {
        match self {
            YangType::Uint8 => Some(u8::MAX.into()),
            YangType::Uint16 => Some(u16::MAX.into()),
            YangType::Uint32 => Some(u32::MAX.into()),
            YangType::Uint64 => Some(u64::MAX),
            _ => None,
        }
    }
}

/// Render a leaf value as XML element text, validating it against its type
pub fn cast_to_text(value: &Value, yang_type: &YangType) -> Result<String> {
    match yang_type {
        YangType::Int8 | YangType::Int16 | YangType::Int32 | YangType::Int64 => {
            Ok(checked_i64(value, yang_type)?.to_string())
        }

        YangType::Uint8 | YangType::Uint16 | YangType::Uint32 | YangType::Uint64 => {
            Ok(checked_u64(value, yang_type)?.to_string())
        }

        YangType::Decimal64 => Ok(value_to_f64(value)?.to_string()),

        YangType::Binary => {
            let s = value.as_str().ok_or_else(|| {
                NetconfError::TypeConversion(format!("binary leaf must be a string: {}", value))
            })?;
            BASE64
                .decode(s)
                .map_err(|e| NetconfError::TypeConversion(format!("base64 decode: {}", e)))?;
            Ok(s.to_string())
        }

        YangType::Boolean => value_to_bool(value).map(|b| b.to_string()),

        YangType::Empty => match value {
            Value::Null | Value::Bool(true) => Ok(String::new()),
            _ => Err(NetconfError::TypeConversion(format!(
                "empty leaf cannot carry {}",
                value
            ))),
        },

        YangType::Enumeration(enum_map) => enum_name(value, enum_map),

        YangType::Union(types) => {
            // Try each member type in order
            for t in types {
                if let Ok(text) = cast_to_text(value, t) {
                    return Ok(text);
                }
            }
            Err(NetconfError::TypeConversion(format!(
                "no union member accepts {}",
                value
            )))
        }

        YangType::String
        | YangType::Identityref
        | YangType::Leafref
        | YangType::Bits
        | YangType::Unknown(_) => Ok(plain_text(value)),
    }
}

/// Convert XML element text back to a typed JSON value
pub fn cast_from_text(text: &str, yang_type: &YangType) -> Result<Value> {
    let text = text.trim();
    match yang_type {
        YangType::Int8 | YangType::Int16 | YangType::Int32 | YangType::Int64 => {
            let n = checked_i64(&Value::String(text.to_string()), yang_type)?;
            Ok(Value::Number(n.into()))
        }

        YangType::Uint8 | YangType::Uint16 | YangType::Uint32 | YangType::Uint64 => {
            let n = checked_u64(&Value::String(text.to_string()), yang_type)?;
            Ok(Value::Number(n.into()))
        }

        YangType::Decimal64 => {
            let f: f64 = text
                .parse()
                .map_err(|_| NetconfError::TypeConversion(format!("cannot parse '{}' as decimal64", text)))?;
            Ok(serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }

        YangType::Boolean => value_to_bool(&Value::String(text.to_string())).map(Value::Bool),

        // Presence is the value
        YangType::Empty => Ok(Value::Bool(true)),

        YangType::Enumeration(enum_map) => {
            if enum_map.contains_key(text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(NetconfError::TypeConversion(format!(
                    "enumeration value not found: {}",
                    text
                )))
            }
        }

        YangType::Union(types) => {
            for t in types {
                if let Ok(v) = cast_from_text(text, t) {
                    return Ok(v);
                }
            }
            Ok(Value::String(text.to_string()))
        }

        YangType::String
        | YangType::Binary
        | YangType::Identityref
        | YangType::Leafref
        | YangType::Bits
        | YangType::Unknown(_) => Ok(Value::String(text.to_string())),
    }
}

/// Cast a leaf value to its RFC 7951 JSON representation
///
/// 64-bit integers and decimal64 are carried as strings, empty leaves as `[null]`.
pub fn cast_to_json(value: &Value, yang_type: &YangType) -> Result<Value> {
    match yang_type {
        YangType::Int64 | YangType::Uint64 | YangType::Decimal64 => {
            Ok(Value::String(cast_to_text(value, yang_type)?))
        }

        YangType::Int8 | YangType::Int16 | YangType::Int32 => {
            Ok(Value::Number(checked_i64(value, yang_type)?.into()))
        }

        YangType::Uint8 | YangType::Uint16 | YangType::Uint32 => {
            Ok(Value::Number(checked_u64(value, yang_type)?.into()))
        }

        YangType::Boolean => value_to_bool(value).map(Value::Bool),

        YangType::Empty => {
            cast_to_text(value, yang_type)?;
            Ok(Value::Array(vec![Value::Null]))
        }

        YangType::Union(types) => {
            for t in types {
                if let Ok(v) = cast_to_json(value, t) {
                    return Ok(v);
                }
            }
            Err(NetconfError::TypeConversion(format!(
                "no union member accepts {}",
                value
            )))
        }

        _ => Ok(Value::String(cast_to_text(value, yang_type)?)),
    }
}

/// Cast an RFC 7951 JSON leaf back to the in-memory representation
pub fn cast_from_json(value: &Value, yang_type: &YangType) -> Result<Value> {
    match (yang_type, value) {
        (YangType::Empty, Value::Array(arr)) if arr.len() == 1 && arr[0].is_null() => {
            Ok(Value::Bool(true))
        }
        (YangType::Union(types), _) => {
            for t in types {
                if let Ok(v) = cast_from_json(value, t) {
                    return Ok(v);
                }
            }
            Ok(value.clone())
        }
        (_, Value::String(s)) => cast_from_text(s, yang_type),
        (_, Value::Number(_) | Value::Bool(_)) => cast_from_text(&plain_text(value), yang_type),
        _ => Err(NetconfError::TypeConversion(format!(
            "unexpected JSON leaf {} for {:?}",
            value, yang_type
        ))),
    }
}

fn enum_name(value: &Value, enum_map: &HashMap<String, i64>) -> Result<String> {
    // Look up enum by name, then by assigned value
    if let Some(s) = value.as_str()
        && enum_map.contains_key(s)
    {
        return Ok(s.to_string());
    }
    if let Some(n) = value.as_i64()
        && let Some((name, _)) = enum_map.iter().find(|(_, v)| **v == n)
    {
        return Ok(name.clone());
    }
    Err(NetconfError::TypeConversion(format!(
        "enumeration value not found: {}",
        value
    )))
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn checked_i64(value: &Value, yang_type: &YangType) -> Result<i64> {
    let n = value_to_i64(value)?;
    match yang_type.signed_range() {
        Some((min, max)) if n < min || n > max => Err(NetconfError::TypeConversion(format!(
            "{} out of range for {:?}",
            n, yang_type
        ))),
        _ => Ok(n),
    }
}

fn checked_u64(value: &Value, yang_type: &YangType) -> Result<u64> {
    let n = value_to_u64(value)?;
    match yang_type.unsigned_max() {
        Some(max) if n > max => Err(NetconfError::TypeConversion(format!(
            "{} out of range for {:?}",
            n, yang_type
        ))),
        _ => Ok(n),
    }
}

fn value_to_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        _ => Err(NetconfError::TypeConversion(format!(
            "cannot convert {} to boolean",
            value
        ))),
    }
}

fn value_to_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| NetconfError::TypeConversion(format!("cannot convert {} to i64", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| NetconfError::TypeConversion(format!("cannot parse '{}' as i64", s))),
        _ => Err(NetconfError::TypeConversion(format!(
            "cannot convert {:?} to i64",
            value
        ))),
    }
}

fn value_to_u64(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| NetconfError::TypeConversion(format!("cannot convert {} to u64", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| NetconfError::TypeConversion(format!("cannot parse '{}' as u64", s))),
        _ => Err(NetconfError::TypeConversion(format!(
            "cannot convert {:?} to u64",
            value
        ))),
    }
}

fn value_to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| NetconfError::TypeConversion(format!("cannot convert {} to f64", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| NetconfError::TypeConversion(format!("cannot parse '{}' as f64", s))),
        _ => Err(NetconfError::TypeConversion(format!(
            "cannot convert {:?} to f64",
            value
        ))),
    }
}
