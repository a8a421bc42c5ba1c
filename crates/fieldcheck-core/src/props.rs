//! Typed readers for schema props values.

use serde_json::Value;

use crate::errors::SchemaError;
use crate::value::kind_name;

fn invalid(key: &str, expected: &str, found: &Value) -> SchemaError {
    SchemaError::InvalidValue {
        key: key.to_string(),
        reason: format!("expected {}, {} given", expected, kind_name(found)),
    }
}

pub(crate) fn string(key: &str, value: &Value) -> Result<String, SchemaError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a string", value))
}

/// `null` clears the attribute.
pub(crate) fn optional_string(key: &str, value: &Value) -> Result<Option<String>, SchemaError> {
    match value {
        Value::Null => Ok(None),
        other => string(key, other).map(Some),
    }
}

pub(crate) fn boolean(key: &str, value: &Value) -> Result<bool, SchemaError> {
    value.as_bool().ok_or_else(|| invalid(key, "a boolean", value))
}

pub(crate) fn optional_boolean(key: &str, value: &Value) -> Result<Option<bool>, SchemaError> {
    match value {
        Value::Null => Ok(None),
        other => boolean(key, other).map(Some),
    }
}

pub(crate) fn number(key: &str, value: &Value) -> Result<f64, SchemaError> {
    value.as_f64().ok_or_else(|| invalid(key, "a number", value))
}

pub(crate) fn optional_number(key: &str, value: &Value) -> Result<Option<f64>, SchemaError> {
    match value {
        Value::Null => Ok(None),
        other => number(key, other).map(Some),
    }
}
