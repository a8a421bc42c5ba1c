//! Composite fields: several schema variants combined with `oneOf`, `anyOf` or `allOf`.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::{CoercionError, SchemaError, ValidationError};
use crate::field::Field;
use crate::props;
use crate::schema::Schema;
use crate::types::{Combinator, Pattern};
use crate::validate::{Fieldable, Validation, ValidationContext};
use crate::value::kind_name;

/// A composite validation unit.
///
/// Every variant is validated against the same value, in insertion order. The
/// composite's own base constraints (`required`, `min`, `max`, `pattern`, `same`,
/// `sameLabel`) are checked next and preempt the combinator when they fail.
///
/// # Example
///
/// ```rust
/// use fieldcheck_core::{Combinator, Field, FieldType, Fieldable, VariableField};
/// use serde_json::json;
///
/// let id = VariableField::new("id", Combinator::OneOf)
///     .with_variant(Field::new("numeric").with_type(FieldType::Integer))
///     .with_variant(Field::new("slug").with_type(FieldType::String).with_pattern("^[a-z-]+$").unwrap());
///
/// assert!(id.is_valid(Some(&json!("my-post"))));
/// assert_eq!(id.convert_type(Some(&json!("17"))).unwrap(), Some(json!(17)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VariableField {
    pub name: String,
    pub label: Option<String>,
    pub combinator: Combinator,
    pub fields: IndexMap<String, Schema>,
    pub required: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Pattern>,
    pub same: Option<String>,
    pub same_label: Option<String>,
}

impl VariableField {
    pub fn new(name: impl Into<String>, combinator: Combinator) -> Self {
        Self {
            name: name.into(),
            combinator,
            ..Default::default()
        }
    }

    /// Build a composite from a props mapping.
    ///
    /// `fields` is either a mapping of variant name to definition or a sequence of
    /// definitions. Variants without a `name` take their key (or index).
    pub fn from_props(props: &Value, config: &EngineConfig) -> Result<Self, SchemaError> {
        let mut variable = VariableField::default();

        let map = match props {
            Value::Null => return Ok(variable),
            Value::Object(map) => map,
            other => {
                config.diagnose(SchemaError::NotAMapping {
                    context: "variable field".to_string(),
                    found: kind_name(other).to_string(),
                })?;
                return Ok(variable);
            }
        };

        for (key, value) in map {
            if let Err(error) = variable.assign(key, value, config) {
                config.diagnose(error)?;
            }
        }
        Ok(variable)
    }

    fn assign(&mut self, key: &str, value: &Value, config: &EngineConfig) -> Result<(), SchemaError> {
        match key {
            "name" => self.name = props::string(key, value)?,
            "label" => self.label = props::optional_string(key, value)?,
            "type" => {
                self.combinator = match props::optional_string(key, value)? {
                    Some(name) => Combinator::from_name(&name),
                    None => Combinator::default(),
                }
            }
            "fields" => self.fields = Self::variants_from_props(value, config)?,
            "required" => self.required = props::optional_boolean(key, value)?,
            "min" => self.min = props::optional_number(key, value)?,
            "max" => self.max = props::optional_number(key, value)?,
            "pattern" => {
                self.pattern = match props::optional_string(key, value)? {
                    Some(source) => Some(Pattern::new(&source)?),
                    None => None,
                }
            }
            "same" => self.same = props::optional_string(key, value)?,
            "sameLabel" | "same_label" => self.same_label = props::optional_string(key, value)?,
            unknown => {
                return Err(SchemaError::UnknownKey {
                    key: unknown.to_string(),
                    context: "variable field".to_string(),
                })
            }
        }
        Ok(())
    }

    fn variants_from_props(
        value: &Value,
        config: &EngineConfig,
    ) -> Result<IndexMap<String, Schema>, SchemaError> {
        let mut variants = IndexMap::new();
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (key, definition) in map {
                    let mut schema = Schema::from_props(definition, config)?;
                    schema.name_if_unnamed(key);
                    variants.insert(key.clone(), schema);
                }
            }
            Value::Array(definitions) => {
                for (index, definition) in definitions.iter().enumerate() {
                    let mut schema = Schema::from_props(definition, config)?;
                    schema.name_if_unnamed(&index.to_string());
                    variants.insert(schema.name().to_string(), schema);
                }
            }
            other => {
                return Err(SchemaError::InvalidValue {
                    key: "fields".to_string(),
                    reason: format!("expected a mapping or a sequence, {} given", kind_name(other)),
                })
            }
        }
        Ok(variants)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a variant keyed by its name.
    pub fn with_variant(mut self, variant: impl Into<Schema>) -> Self {
        let variant = variant.into();
        self.fields.insert(variant.name().to_string(), variant);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        self.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn with_same(mut self, sibling: impl Into<String>) -> Self {
        self.same = Some(sibling.into());
        self
    }

    pub fn with_same_label(mut self, label: impl Into<String>) -> Self {
        self.same_label = Some(label.into());
        self
    }

    /// The base constraints as a plain field, or `None` when none is set.
    ///
    /// Unset attributes keep the leaf defaults, so setting only `max` still makes
    /// the composite required.
    pub fn base_field(&self) -> Option<Field> {
        let any_set = self.required.is_some()
            || self.min.is_some()
            || self.max.is_some()
            || self.pattern.is_some()
            || self.same.is_some()
            || self.same_label.is_some();
        if !any_set {
            return None;
        }

        Some(Field {
            name: self.name.clone(),
            label: self.label.clone(),
            required: self.required.unwrap_or(true),
            min: self.min.unwrap_or(0.0),
            max: self.max,
            pattern: self.pattern.clone(),
            same: self.same.clone(),
            same_label: self.same_label.clone(),
            ..Default::default()
        })
    }

    fn combine(&self, mut errors: Vec<Option<ValidationError>>) -> Validation {
        let passed = errors.iter().filter(|error| error.is_none()).count();
        let valid = match &self.combinator {
            Combinator::AnyOf => passed > 0,
            Combinator::AllOf => passed == errors.len(),
            Combinator::OneOf if passed > 1 => {
                errors.insert(0, Some(ValidationError::one_variant(&self.name)));
                false
            }
            Combinator::OneOf => passed == 1,
            Combinator::Other(_) => true,
        };

        debug!(
            field = %self.name,
            combinator = %self.combinator,
            passed,
            valid,
            "combined variant outcomes"
        );

        let error = errors.iter().flatten().next().cloned();
        Validation {
            valid,
            error,
            errors,
        }
    }
}

impl Fieldable for VariableField {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn same(&self) -> Option<&str> {
        self.same.as_deref()
    }

    fn same_label(&self) -> Option<&str> {
        self.same_label.as_deref()
    }

    fn validate_in(&self, value: Option<&Value>, ctx: &ValidationContext) -> Validation {
        let mut errors: Vec<Option<ValidationError>> = self
            .fields
            .values()
            .map(|variant| {
                let outcome = variant.validate_in(value, ctx);
                match (outcome.valid, outcome.error) {
                    (true, _) => None,
                    (false, Some(error)) => Some(error),
                    (false, None) => Some(ValidationError::invalid(
                        variant.name(),
                        variant.label_or_name(),
                    )),
                }
            })
            .collect();

        if let Some(base) = self.base_field() {
            let outcome = base.validate_in(value, ctx);
            if !outcome.valid {
                debug!(field = %self.name, "base constraints rejected the value");
                let error = outcome
                    .error
                    .unwrap_or_else(|| ValidationError::invalid(&self.name, self.label_or_name()));
                errors.insert(0, Some(error.clone()));
                return Validation {
                    valid: false,
                    error: Some(error),
                    errors,
                };
            }
        }

        self.combine(errors)
    }

    /// Converted by the first variant that accepts the value, else returned unchanged.
    fn convert_type_in(
        &self,
        value: Option<&Value>,
        ctx: &ValidationContext,
    ) -> Result<Option<Value>, CoercionError> {
        for variant in self.fields.values() {
            if variant.validate_in(value, ctx).valid {
                return variant.convert_type_with_default_in(value, ctx);
            }
        }
        Ok(value.cloned())
    }
}
