//! JSON representation of log records.
//!
//! Used for JSONL input and output. Scalars map to JSON scalars, addresses
//! and subnets to strings, collections to arrays and absent values to
//! `null`. Non-finite floats are written as the strings `NaN`, `Infinity`
//! and `-Infinity`.

use crate::schema::FieldDescriptor;
use crate::types::LogType;
use crate::values::{LogRow, LogValue, Subnet, TypedValue};
use serde_json::{Map, Number, Value};
use std::net::IpAddr;

/// Errors converting JSON into typed values.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: LogType,
        actual: String,
    },

    #[error("field '{field}': type {log_type} cannot be represented")]
    Unsupported { field: String, log_type: LogType },

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convert a typed value to JSON.
pub fn to_json(value: &TypedValue) -> Value {
    value_to_json(&value.log_type, &value.value)
}

fn value_to_json(log_type: &LogType, value: &LogValue) -> Value {
    match value {
        LogValue::Null => Value::Null,
        LogValue::Bool(b) => Value::Bool(*b),
        LogValue::Int(i) => Value::from(*i),
        LogValue::Count(c) => Value::from(*c),
        LogValue::Port(p) => Value::from(*p),
        LogValue::Double(f) => match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None if f.is_nan() => Value::String("NaN".to_string()),
            None if *f > 0.0 => Value::String("Infinity".to_string()),
            None => Value::String("-Infinity".to_string()),
        },
        LogValue::Addr(a) => Value::String(a.to_string()),
        LogValue::Subnet(s) => Value::String(s.to_string()),
        LogValue::String(s) => Value::String(s.clone()),
        LogValue::Elements(elements) => {
            let element_type = log_type.element_type().unwrap_or(log_type);
            Value::Array(
                elements
                    .iter()
                    .map(|e| value_to_json(element_type, e))
                    .collect(),
            )
        }
    }
}

/// Convert JSON into a typed value of the given type.
pub fn from_json(field: &str, json: &Value, log_type: &LogType) -> Result<TypedValue, JsonError> {
    let value = json_to_value(field, json, log_type)?;
    Ok(TypedValue::new(log_type.clone(), value))
}

fn json_to_value(field: &str, json: &Value, log_type: &LogType) -> Result<LogValue, JsonError> {
    if json.is_null() {
        return Ok(LogValue::Null);
    }

    let mismatch = || JsonError::TypeMismatch {
        field: field.to_string(),
        expected: log_type.clone(),
        actual: json.to_string(),
    };

    let value = match log_type {
        LogType::Bool => LogValue::Bool(json.as_bool().ok_or_else(mismatch)?),
        LogType::Int => LogValue::Int(json.as_i64().ok_or_else(mismatch)?),
        LogType::Count => LogValue::Count(json.as_u64().ok_or_else(mismatch)?),
        LogType::Port => {
            let port = json.as_u64().ok_or_else(mismatch)?;
            LogValue::Port(u16::try_from(port).map_err(|_| mismatch())?)
        }
        LogType::Double | LogType::Time | LogType::Interval => match json {
            Value::Number(n) => LogValue::Double(n.as_f64().ok_or_else(mismatch)?),
            Value::String(s) => match s.as_str() {
                "NaN" => LogValue::Double(f64::NAN),
                "Infinity" => LogValue::Double(f64::INFINITY),
                "-Infinity" => LogValue::Double(f64::NEG_INFINITY),
                _ => return Err(mismatch()),
            },
            _ => return Err(mismatch()),
        },
        LogType::Addr => {
            let text = json.as_str().ok_or_else(mismatch)?;
            LogValue::Addr(text.parse::<IpAddr>().map_err(|_| mismatch())?)
        }
        LogType::Subnet => {
            let text = json.as_str().ok_or_else(mismatch)?;
            LogValue::Subnet(text.parse::<Subnet>().map_err(|_| mismatch())?)
        }
        LogType::Enum | LogType::String | LogType::File | LogType::Func => {
            LogValue::String(json.as_str().ok_or_else(mismatch)?.to_string())
        }
        LogType::Set(element_type) | LogType::Vector(element_type) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            let elements = items
                .iter()
                .map(|item| json_to_value(field, item, element_type))
                .collect::<Result<Vec<_>, _>>()?;
            LogValue::Elements(elements)
        }
        LogType::Record | LogType::Pattern | LogType::Table | LogType::Any | LogType::Opaque => {
            return Err(JsonError::Unsupported {
                field: field.to_string(),
                log_type: log_type.clone(),
            })
        }
    };
    Ok(value)
}

/// Convert a row to a JSON object keyed by field name.
pub fn row_to_json(fields: &[FieldDescriptor], row: &[TypedValue]) -> Value {
    let object: Map<String, Value> = fields
        .iter()
        .zip(row)
        .map(|(field, value)| (field.name.clone(), to_json(value)))
        .collect();
    Value::Object(object)
}

/// Build a row from a JSON object. Missing keys are absent values.
pub fn row_from_json(fields: &[FieldDescriptor], json: &Value) -> Result<LogRow, JsonError> {
    let object = json.as_object().ok_or(JsonError::NotAnObject)?;
    fields
        .iter()
        .map(|field| {
            let value = object.get(&field.name).unwrap_or(&Value::Null);
            from_json(&field.name, value, &field.field_type)
        })
        .collect()
}

/// Parse one JSONL line into a row.
pub fn parse_jsonl_line(fields: &[FieldDescriptor], line: &str) -> Result<LogRow, JsonError> {
    let json: Value = serde_json::from_str(line)?;
    row_from_json(fields, &json)
}
