//! Declared field types, combinator kinds and constraint values.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use crate::errors::SchemaError;
use crate::value::to_display_string;

/// The declared type of a leaf field.
///
/// Type names are grouped into families: `number`/`int`/`integer`/`float` coerce
/// to numbers, `bool`/`boolean` to booleans. An absent type ([`FieldType::Any`])
/// or an unrecognized name ([`FieldType::Other`]) passes values through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldType {
    String,
    Number,
    Int,
    Integer,
    Float,
    Bool,
    Boolean,
    Array,
    #[default]
    Any,
    Other(String),
}

impl FieldType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "int" => FieldType::Int,
            "integer" => FieldType::Integer,
            "float" => FieldType::Float,
            "bool" => FieldType::Bool,
            "boolean" => FieldType::Boolean,
            "array" => FieldType::Array,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Int => "int",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Any => "any",
            FieldType::Other(name) => name,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, FieldType::String)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            FieldType::Number | FieldType::Int | FieldType::Integer | FieldType::Float
        )
    }

    /// Integer members of the number family.
    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Integer)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, FieldType::Bool | FieldType::Boolean)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a composite combines the outcomes of its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    /// Exactly one variant accepts the value.
    OneOf,
    /// At least one variant accepts the value.
    AnyOf,
    /// Every variant accepts the value.
    AllOf,
    /// Unrecognized or missing kind. Always valid.
    Other(String),
}

impl Default for Combinator {
    fn default() -> Self {
        Combinator::Other(String::new())
    }
}

impl Combinator {
    pub fn from_name(name: &str) -> Self {
        match name {
            "oneOf" => Combinator::OneOf,
            "anyOf" => Combinator::AnyOf,
            "allOf" => Combinator::AllOf,
            other => Combinator::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Combinator::OneOf => "oneOf",
            Combinator::AnyOf => "anyOf",
            Combinator::AllOf => "allOf",
            Combinator::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Combinator::Other(_))
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled `pattern` constraint.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(source).map_err(|source_error| SchemaError::InvalidPattern {
            pattern: source.to_string(),
            source: source_error,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// The set of values a field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Options {
    /// Allowed values, compared against the coerced value.
    Values(Vec<Value>),
    /// Allowed keys mapped to display labels. The value's string form must be a key.
    Labeled(IndexMap<String, Value>),
}

impl Options {
    /// Read options from props: a sequence of values or a mapping of key to label.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Options::Values(items.clone())),
            Value::Object(map) => Some(Options::Labeled(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            _ => None,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Options::Values(values) => values.iter().any(|allowed| loosely_equal(allowed, value)),
            Options::Labeled(labels) => labels.contains_key(&to_display_string(value)),
        }
    }

    /// The allowed values, as shown in error messages.
    pub fn allowed(&self) -> Vec<String> {
        match self {
            Options::Values(values) => values.iter().map(to_display_string).collect(),
            Options::Labeled(labels) => labels.keys().cloned().collect(),
        }
    }
}

/// JSON equality, except that numbers compare by value (`2 == 2.0`).
fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_families() {
        for name in ["number", "int", "integer", "float"] {
            assert!(FieldType::from_name(name).is_number(), "{}", name);
        }
        assert!(FieldType::from_name("int").is_integer());
        assert!(!FieldType::from_name("float").is_integer());
        assert!(FieldType::from_name("bool").is_boolean());
        assert!(FieldType::from_name("boolean").is_boolean());
        assert_eq!(FieldType::from_name("date"), FieldType::Other("date".into()));
        assert_eq!(FieldType::from_name("date").as_str(), "date");
    }

    #[test]
    fn test_combinator_names() {
        assert_eq!(Combinator::from_name("oneOf"), Combinator::OneOf);
        assert!(Combinator::from_name("allOf").is_known());
        assert!(!Combinator::from_name("someOf").is_known());
        assert!(!Combinator::default().is_known());
    }

    #[test]
    fn test_pattern() {
        let pattern = Pattern::new(r"^\d{3}$").expect("valid pattern");
        assert!(pattern.is_match("123"));
        assert!(!pattern.is_match("12a"));
        assert!(matches!(
            Pattern::new("(unclosed"),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_options_membership() {
        let values = Options::from_value(&json!([1, 2.5, "a"])).expect("options");
        assert!(values.contains(&json!(1.0)));
        assert!(values.contains(&json!("a")));
        assert!(!values.contains(&json!("1")));
        assert_eq!(values.allowed(), vec!["1", "2.5", "a"]);

        let labeled = Options::from_value(&json!({"ru": "Russian", "en": "English"})).expect("options");
        assert!(labeled.contains(&json!("en")));
        assert!(!labeled.contains(&json!("de")));
        assert_eq!(labeled.allowed(), vec!["ru", "en"]);

        assert!(Options::from_value(&json!("nope")).is_none());
    }
}
