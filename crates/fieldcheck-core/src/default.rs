//! Field default values: a literal, or a producer evaluated on demand.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::SchemaError;

/// Key marking a computed default in schema documents: `{"$computed": "now"}`.
pub const COMPUTED_KEY: &str = "$computed";

type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// The `default` of a field.
#[derive(Clone)]
pub enum DefaultValue {
    /// Returned as-is.
    Literal(Value),
    /// Invoked every time the default is needed.
    Computed(Producer),
}

impl DefaultValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        DefaultValue::Literal(value.into())
    }

    pub fn computed<F>(producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Computed(Arc::new(producer))
    }

    /// Look up a built-in producer by name.
    ///
    /// - `now`: RFC 3339 UTC timestamp
    /// - `today`: `YYYY-MM-DD` UTC date
    /// - `timestamp`: Unix seconds
    /// - `uuid`: a fresh UUID v7
    pub fn named(name: &str) -> Result<Self, SchemaError> {
        let producer = match name {
            "now" => Self::computed(|| {
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
            }),
            "today" => Self::computed(|| {
                Value::String(Utc::now().date_naive().format("%Y-%m-%d").to_string())
            }),
            "timestamp" => Self::computed(|| Value::from(Utc::now().timestamp())),
            "uuid" => Self::computed(|| Value::String(Uuid::now_v7().to_string())),
            other => return Err(SchemaError::UnknownComputedDefault(other.to_string())),
        };
        Ok(producer)
    }

    /// Read a default from props. `{"$computed": name}` selects a built-in producer,
    /// anything else is a literal.
    pub fn from_props(value: &Value) -> Result<Self, SchemaError> {
        if let Some(map) = value.as_object() {
            if map.len() == 1 {
                if let Some(name) = map.get(COMPUTED_KEY) {
                    let name = name.as_str().ok_or_else(|| SchemaError::InvalidValue {
                        key: COMPUTED_KEY.to_string(),
                        reason: "expected the name of a computed default".to_string(),
                    })?;
                    return Self::named(name);
                }
            }
        }
        Ok(DefaultValue::Literal(value.clone()))
    }

    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Computed(producer) => producer(),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, DefaultValue::Computed(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_literal_default() {
        let default = DefaultValue::from_props(&json!({"a": 1})).expect("literal");
        assert!(!default.is_computed());
        assert_eq!(default.resolve(), json!({"a": 1}));
    }

    #[test]
    fn test_computed_default_runs_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let default = DefaultValue::computed(move || json!(counter.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(default.resolve(), json!(0));
        assert_eq!(default.resolve(), json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_named_defaults() {
        let today = DefaultValue::from_props(&json!({"$computed": "today"})).expect("today");
        assert!(today.is_computed());
        let text = today.resolve();
        assert_eq!(text.as_str().map(str::len), Some(10));

        let uuid = DefaultValue::named("uuid").expect("uuid").resolve();
        assert!(Uuid::parse_str(uuid.as_str().unwrap_or_default()).is_ok());

        assert!(DefaultValue::named("timestamp").expect("timestamp").resolve().is_i64());
        assert!(matches!(
            DefaultValue::named("tomorrow"),
            Err(SchemaError::UnknownComputedDefault(_))
        ));
    }
}
