//! Error types for fieldcheck-core.
//!
//! Two families live here:
//!
//! - **Validation failures** ([`ValidationError`], [`ValidationErrors`]) are data.
//!   They are returned inside a [`Validation`](crate::Validation) outcome and never
//!   propagated with `?`.
//! - **Programmer errors** ([`SchemaError`], [`CoercionError`], [`ConfigError`]) are
//!   ordinary `Result` errors raised while building schemas, coercing in strict
//!   mode, or loading configuration.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::value::format_number;

/// Message prepended to a `oneOf` outcome when several variants accept the value.
pub const ONE_VALID_VARIANT: &str = "there must be one valid field variant";

/// The validation rule a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Required,
    Type,
    Min,
    Max,
    Item,
    Pattern,
    Options,
    Same,
    OneVariant,
    Invalid,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Type => "type",
            Rule::Min => "min",
            Rule::Max => "max",
            Rule::Item => "item",
            Rule::Pattern => "pattern",
            Rule::Options => "options",
            Rule::Same => "same",
            Rule::OneVariant => "oneVariant",
            Rule::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a `min`/`max` bound was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Numeric magnitude.
    Magnitude,
    /// String length in characters.
    Characters,
    /// Sequence length.
    Items,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Name of the field that failed.
    ///
    /// Element failures of array fields carry an index suffix, e.g. `"tags[2]"`.
    pub path: String,

    /// Human-readable description of the failure.
    pub message: String,

    /// The rule that was violated.
    pub rule: Rule,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(path: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            rule,
        }
    }

    // --- Common error constructors ---

    /// An empty value where one is required.
    pub fn required(path: impl Into<String>, label: &str) -> Self {
        Self::new(path, Rule::Required, format!("{} is required", label))
    }

    /// A value that did not coerce to a number.
    pub fn not_a_number(path: impl Into<String>, label: &str) -> Self {
        Self::new(path, Rule::Type, format!("{} must be a number", label))
    }

    /// A number with a fractional part on an integer field.
    pub fn not_an_integer(path: impl Into<String>, label: &str) -> Self {
        Self::new(path, Rule::Type, format!("{} must be an integer", label))
    }

    /// A non-sequence value on an array field.
    pub fn not_an_array(path: impl Into<String>, label: &str) -> Self {
        Self::new(path, Rule::Type, format!("{} must be an array", label))
    }

    /// A value below the lower bound.
    pub fn below_min(path: impl Into<String>, label: &str, min: f64, measure: Measure) -> Self {
        let message = match measure {
            Measure::Magnitude => format!("{} must be at least {}", label, format_number(min)),
            Measure::Characters => format!(
                "{} must contain at least {} characters",
                label,
                format_number(min)
            ),
            Measure::Items => format!("{} must contain at least {} items", label, format_number(min)),
        };
        Self::new(path, Rule::Min, message)
    }

    /// A value above the upper bound.
    pub fn above_max(path: impl Into<String>, label: &str, max: f64, measure: Measure) -> Self {
        let message = match measure {
            Measure::Magnitude => format!("{} must be at most {}", label, format_number(max)),
            Measure::Characters => format!(
                "{} must contain at most {} characters",
                label,
                format_number(max)
            ),
            Measure::Items => format!("{} must contain at most {} items", label, format_number(max)),
        };
        Self::new(path, Rule::Max, message)
    }

    /// A string that does not match the field pattern.
    pub fn pattern(path: impl Into<String>, label: &str) -> Self {
        Self::new(path, Rule::Pattern, format!("{} does not match the pattern", label))
    }

    /// A value outside the allowed options.
    pub fn invalid_option(path: impl Into<String>, label: &str, allowed: &[String]) -> Self {
        Self::new(
            path,
            Rule::Options,
            format!("{} must be one of: {}", label, allowed.join(", ")),
        )
    }

    /// A value that differs from the sibling it must equal.
    pub fn mismatch(path: impl Into<String>, label: &str, other: &str) -> Self {
        Self::new(path, Rule::Same, format!("{} must match {}", label, other))
    }

    /// An array element rejected by the element schema.
    pub fn item(label: &str, path: &str, index: usize, inner: ValidationError) -> Self {
        Self::new(
            format!("{}[{}]", path, index),
            Rule::Item,
            format!("{}[{}]: {}", label, index, inner.message),
        )
    }

    /// A failure with no more specific description, e.g. a composite without variants.
    pub fn invalid(path: impl Into<String>, label: &str) -> Self {
        Self::new(path, Rule::Invalid, format!("{} is invalid", label))
    }

    /// Several `oneOf` variants accepted the same value.
    pub fn one_variant(path: impl Into<String>) -> Self {
        Self::new(path, Rule::OneVariant, ONE_VALID_VARIANT)
    }

    /// Qualify the path with an enclosing field name.
    ///
    /// Errors already reported under `prefix` keep their path.
    pub fn with_path_prefix(mut self, prefix: &str) -> Self {
        if self.path.is_empty() || self.path == prefix {
            self.path = prefix.to_string();
        } else if self.path.starts_with('[') {
            self.path = format!("{}{}", prefix, self.path);
        } else {
            self.path = format!("{}.{}", prefix, self.path);
        }
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.rule)
    }
}

impl std::error::Error for ValidationError {}

/// A collection of validation errors, one per failing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First error reported for `path`, if any.
    pub fn for_path(&self, path: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|error| error.path == path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else if self.errors.len() == 1 {
            write!(f, "Validation error: {}", self.errors[0])
        } else {
            writeln!(f, "{} validation errors:", self.errors.len())?;
            for (i, error) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, error)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Problems found while building a schema from props.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{context} props must be a mapping, {found} given")]
    NotAMapping { context: String, found: String },

    #[error("unknown key `{key}` in {context} props")]
    UnknownKey { key: String, context: String },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown computed default `{0}`")]
    UnknownComputedDefault(String),

    #[error("failed to parse {format} document: {message}")]
    Parse { format: String, message: String },
}

/// Raised by strict coercion when a value cannot take the declared type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("field `{field}`: cannot convert {value} to a number")]
    NotANumber { field: String, value: String },
}

/// Failure to load an [`EngineConfig`](crate::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::required("email", "E-mail");
        assert_eq!(error.to_string(), "E-mail is required [required]");
        assert_eq!(error.path, "email");
    }

    #[test]
    fn test_bound_messages_use_plain_numbers() {
        let min = ValidationError::below_min("age", "Age", 18.0, Measure::Magnitude);
        assert_eq!(min.message, "Age must be at least 18");

        let max = ValidationError::above_max("name", "Name", 3.0, Measure::Characters);
        assert_eq!(max.message, "Name must contain at most 3 characters");
        assert_eq!(max.rule, Rule::Max);
    }

    #[test]
    fn test_item_error_prefixes_index() {
        let inner = ValidationError::not_a_number("tags", "Tags");
        let item = ValidationError::item("Tags", "tags", 2, inner);
        assert_eq!(item.path, "tags[2]");
        assert_eq!(item.message, "Tags[2]: Tags must be a number");
    }

    #[test]
    fn test_validation_errors_lookup() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::required("a", "A"));
        errors.push(ValidationError::pattern("b", "B"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_path("b").map(|e| e.rule), Some(Rule::Pattern));
        assert!(errors.for_path("c").is_none());
        assert!(errors.to_string().starts_with("2 validation errors:"));
    }

    #[test]
    fn test_path_prefix() {
        let nested = ValidationError::pattern("card", "card").with_path_prefix("payment");
        assert_eq!(nested.path, "payment.card");

        let own = ValidationError::required("payment", "Payment").with_path_prefix("payment");
        assert_eq!(own.path, "payment");

        let element = ValidationError::new("[2]", Rule::Item, "bad").with_path_prefix("tags");
        assert_eq!(element.path, "tags[2]");
    }
}
