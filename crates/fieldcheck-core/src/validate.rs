//! The validation contract shared by leaf and composite fields.
//!
//! Every schema node implements [`Fieldable`]. Validation never mutates the
//! schema: each call returns a fresh [`Validation`] outcome, so a schema tree can
//! be shared between threads and reused across calls.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{CoercionError, ValidationError};

/// Outcome of validating one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validation {
    pub valid: bool,

    /// First recorded failure.
    ///
    /// For composites this is the first present entry of `errors`, so a valid
    /// `anyOf` outcome can still carry the error of a rejected variant. Use
    /// [`Validation::failure`] to read it only when the value was rejected.
    pub error: Option<ValidationError>,

    /// Per-variant errors of a composite, in variant order. A composite-level
    /// failure (base constraints or an ambiguous `oneOf`) is prepended. Empty for
    /// leaf fields.
    pub errors: Vec<Option<ValidationError>>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub fn fail(error: ValidationError) -> Self {
        Self {
            valid: false,
            error: Some(error),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The error, only when the value was rejected.
    pub fn failure(&self) -> Option<&ValidationError> {
        if self.valid {
            None
        } else {
            self.error.as_ref()
        }
    }

    /// Number of variants that accepted the value.
    pub fn passed(&self) -> usize {
        self.errors.iter().filter(|error| error.is_none()).count()
    }
}

impl From<Result<(), ValidationError>> for Validation {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Validation::ok(),
            Err(error) => Validation::fail(error),
        }
    }
}

/// Values of sibling fields, consulted by `same` constraints.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    siblings: Map<String, Value>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use every entry of a record as a sibling value.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        Self {
            siblings: record.clone(),
        }
    }

    pub fn with_sibling(mut self, name: impl Into<String>, value: Value) -> Self {
        self.siblings.insert(name.into(), value);
        self
    }

    pub fn sibling(&self, name: &str) -> Option<&Value> {
        self.siblings.get(name)
    }
}

/// Capability shared by [`Field`](crate::Field), [`VariableField`](crate::VariableField)
/// and [`Schema`](crate::Schema).
///
/// Values are `Option<&Value>`: `None` is an absent value, `Some(Value::Null)` an
/// explicit null. Both count as empty.
pub trait Fieldable {
    fn name(&self) -> &str;

    fn label(&self) -> Option<&str>;

    /// Name of the sibling this field must equal.
    fn same(&self) -> Option<&str>;

    fn same_label(&self) -> Option<&str>;

    /// The label when set and non-empty, else the name.
    fn label_or_name(&self) -> &str {
        match self.label() {
            Some(label) if !label.is_empty() => label,
            _ => self.name(),
        }
    }

    fn same_label_or_name(&self) -> Option<&str> {
        match self.same_label() {
            Some(label) if !label.is_empty() => Some(label),
            _ => self.same(),
        }
    }

    /// Validate `value` with sibling values from `ctx`.
    fn validate_in(&self, value: Option<&Value>, ctx: &ValidationContext) -> Validation;

    fn validate(&self, value: Option<&Value>) -> Validation {
        self.validate_in(value, &ValidationContext::default())
    }

    fn is_valid(&self, value: Option<&Value>) -> bool {
        self.validate(value).valid
    }

    /// Normalize `value` to the declared type.
    ///
    /// Only fails under [`CoercionMode::Strict`](crate::CoercionMode::Strict).
    fn convert_type_in(
        &self,
        value: Option<&Value>,
        ctx: &ValidationContext,
    ) -> Result<Option<Value>, CoercionError>;

    fn convert_type(&self, value: Option<&Value>) -> Result<Option<Value>, CoercionError> {
        self.convert_type_in(value, &ValidationContext::default())
    }

    /// The default value, if the node has one.
    fn get_default(&self) -> Option<Value> {
        None
    }

    /// Substitute the default for an absent value, then convert.
    fn convert_type_with_default_in(
        &self,
        value: Option<&Value>,
        ctx: &ValidationContext,
    ) -> Result<Option<Value>, CoercionError> {
        match value {
            Some(value) => self.convert_type_in(Some(value), ctx),
            None => {
                let default = self.get_default();
                self.convert_type_in(default.as_ref(), ctx)
            }
        }
    }

    fn convert_type_with_default(
        &self,
        value: Option<&Value>,
    ) -> Result<Option<Value>, CoercionError> {
        self.convert_type_with_default_in(value, &ValidationContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Rule;
    use serde_json::json;

    #[test]
    fn test_failure_hidden_when_valid() {
        let mut outcome = Validation::ok();
        outcome.error = Some(ValidationError::required("a", "A"));
        assert!(outcome.failure().is_none());

        outcome.valid = false;
        assert_eq!(outcome.failure().map(|e| e.rule), Some(Rule::Required));
    }

    #[test]
    fn test_passed_counts_absent_entries() {
        let outcome = Validation {
            valid: false,
            error: None,
            errors: vec![None, Some(ValidationError::required("a", "A")), None],
        };
        assert_eq!(outcome.passed(), 2);
    }

    #[test]
    fn test_context_siblings() {
        let mut record = Map::new();
        record.insert("password".into(), json!("hunter2"));

        let ctx = ValidationContext::from_record(&record).with_sibling("extra", json!(1));
        assert_eq!(ctx.sibling("password"), Some(&json!("hunter2")));
        assert_eq!(ctx.sibling("extra"), Some(&json!(1)));
        assert!(ctx.sibling("missing").is_none());
    }
}
