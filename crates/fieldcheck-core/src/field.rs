//! Leaf fields: a single named value with type, bounds and constraints.

use serde_json::Value;
use tracing::trace;

use crate::config::{CoercionMode, EngineConfig};
use crate::default::DefaultValue;
use crate::errors::{CoercionError, Measure, SchemaError, ValidationError};
use crate::props;
use crate::schema::Schema;
use crate::types::{FieldType, Options, Pattern};
use crate::validate::{Fieldable, Validation, ValidationContext};
use crate::value::{self, describe, is_truthy, number_value, to_display_string, to_number};

/// A leaf validation and coercion unit.
///
/// # Example
///
/// ```rust
/// use fieldcheck_core::{Field, FieldType, Fieldable};
/// use serde_json::json;
///
/// let age = Field::new("age").with_type(FieldType::Integer).with_max(150.0);
///
/// assert!(age.is_valid(Some(&json!("42"))));
/// assert_eq!(age.convert_type(Some(&json!("42"))).unwrap(), Some(json!(42)));
/// assert!(!age.is_valid(Some(&json!("forty"))));
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub label: Option<String>,
    pub required: bool,
    pub field_type: FieldType,
    /// Lower bound on magnitude, character count or item count.
    pub min: f64,
    pub max: Option<f64>,
    pub pattern: Option<Pattern>,
    pub options: Option<Options>,
    pub same: Option<String>,
    pub same_label: Option<String>,
    pub default: Option<DefaultValue>,
    /// Current value, used when a record does not supply one.
    pub value: Option<Value>,
    /// Schema for each element of an array field.
    pub item_of: Option<Box<Schema>>,
    pub coercion: CoercionMode,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            name: String::new(),
            label: None,
            required: true,
            field_type: FieldType::Any,
            min: 0.0,
            max: None,
            pattern: None,
            options: None,
            same: None,
            same_label: None,
            default: None,
            value: None,
            item_of: None,
            coercion: CoercionMode::Lenient,
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a field from a props mapping.
    ///
    /// Recognized keys are `name`, `label`, `required`, `type`, `min`, `max`,
    /// `pattern`, `options`, `same`, `sameLabel`, `default`, `value` and `itemOf`.
    /// Anything else, and values of the wrong shape, are handled by the
    /// configured [`ConstructionMode`](crate::ConstructionMode).
    pub fn from_props(props: &Value, config: &EngineConfig) -> Result<Self, SchemaError> {
        let mut field = Field {
            coercion: config.coercion,
            ..Default::default()
        };

        let map = match props {
            Value::Null => return Ok(field),
            Value::Object(map) => map,
            other => {
                config.diagnose(SchemaError::NotAMapping {
                    context: "field".to_string(),
                    found: value::kind_name(other).to_string(),
                })?;
                return Ok(field);
            }
        };

        for (key, value) in map {
            if let Err(error) = field.assign(key, value, config) {
                config.diagnose(error)?;
            }
        }
        Ok(field)
    }

    fn assign(&mut self, key: &str, value: &Value, config: &EngineConfig) -> Result<(), SchemaError> {
        match key {
            "name" => self.name = props::string(key, value)?,
            "label" => self.label = props::optional_string(key, value)?,
            "required" => self.required = props::boolean(key, value)?,
            "type" => {
                self.field_type = match props::optional_string(key, value)? {
                    Some(name) => FieldType::from_name(&name),
                    None => FieldType::Any,
                }
            }
            "min" => self.min = props::optional_number(key, value)?.unwrap_or(0.0),
            "max" => self.max = props::optional_number(key, value)?,
            "pattern" => {
                self.pattern = match props::optional_string(key, value)? {
                    Some(source) => Some(Pattern::new(&source)?),
                    None => None,
                }
            }
            "options" => {
                self.options = match value {
                    Value::Null => None,
                    other => Some(Options::from_value(other).ok_or_else(|| {
                        SchemaError::InvalidValue {
                            key: key.to_string(),
                            reason: "expected a sequence or a mapping".to_string(),
                        }
                    })?),
                }
            }
            "same" => self.same = props::optional_string(key, value)?,
            "sameLabel" | "same_label" => self.same_label = props::optional_string(key, value)?,
            "default" => self.default = Some(DefaultValue::from_props(value)?),
            "value" => self.value = Some(value.clone()),
            "itemOf" | "item_of" => {
                self.item_of = match value {
                    Value::Null => None,
                    other => Some(Box::new(Schema::from_props(other, config)?)),
                }
            }
            unknown => {
                return Err(SchemaError::UnknownKey {
                    key: unknown.to_string(),
                    context: "field".to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.with_required(false)
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = min;
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

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_same(mut self, sibling: impl Into<String>) -> Self {
        self.same = Some(sibling.into());
        self
    }

    pub fn with_same_label(mut self, label: impl Into<String>) -> Self {
        self.same_label = Some(label.into());
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_item_of(mut self, item: impl Into<Schema>) -> Self {
        self.item_of = Some(Box::new(item.into()));
        self
    }

    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercion = mode;
        self
    }

    /// True when `value` is absent or null.
    pub fn is_empty_value(value: Option<&Value>) -> bool {
        value::is_empty(value)
    }

    /// True when the field's own value is absent or null.
    pub fn is_empty(&self) -> bool {
        value::is_empty(self.value.as_ref())
    }

    fn coerce(
        &self,
        value: Option<&Value>,
        mode: CoercionMode,
        ctx: &ValidationContext,
    ) -> Result<Option<Value>, CoercionError> {
        if !self.required && value::is_empty(value) {
            return Ok(Some(Value::Null));
        }

        let field_type = &self.field_type;
        if field_type.is_array() {
            return match (value, &self.item_of) {
                (Some(Value::Array(items)), Some(item)) => {
                    let converted = items
                        .iter()
                        .map(|element| {
                            item.convert_type_with_default_in(Some(element), ctx)
                                .map(|converted| converted.unwrap_or(Value::Null))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Some(Value::Array(converted)))
                }
                (Some(Value::Array(items)), None) => Ok(Some(Value::Array(items.clone()))),
                (other, _) => Ok(other.cloned()),
            };
        }

        if field_type.is_string() {
            return Ok(Some(Value::String(match value {
                None | Some(Value::Null) => String::new(),
                Some(other) => to_display_string(other),
            })));
        }

        if field_type.is_number() {
            return match to_number(value).and_then(number_value) {
                Some(number) => Ok(Some(number)),
                None if mode == CoercionMode::Strict => Err(CoercionError::NotANumber {
                    field: self.name.clone(),
                    value: describe(value),
                }),
                None => Ok(value.cloned()),
            };
        }

        if field_type.is_boolean() {
            return Ok(Some(Value::Bool(is_truthy(value))));
        }

        Ok(value.cloned())
    }

    fn check(&self, raw: &Value, ctx: &ValidationContext) -> Result<(), ValidationError> {
        let label = self.label_or_name();
        let converted = match self.coerce(Some(raw), CoercionMode::Lenient, ctx) {
            Ok(Some(converted)) => converted,
            _ => raw.clone(),
        };

        self.check_kind(&converted, label)?;
        self.check_items(raw, label, ctx)?;

        if let (Some(pattern), Value::String(text)) = (&self.pattern, &converted) {
            if !pattern.is_match(text) {
                return Err(ValidationError::pattern(&self.name, label));
            }
        }

        if let Some(options) = &self.options {
            let accepted = match &converted {
                Value::Array(items) => items.iter().all(|item| options.contains(item)),
                other => options.contains(other),
            };
            if !accepted {
                return Err(ValidationError::invalid_option(&self.name, label, &options.allowed()));
            }
        }

        if let Some(same) = &self.same {
            if ctx.sibling(same) != Some(raw) {
                let other = self.same_label_or_name().unwrap_or(same);
                return Err(ValidationError::mismatch(&self.name, label, other));
            }
        }

        Ok(())
    }

    /// Type check, then bounds measured according to the type.
    fn check_kind(&self, converted: &Value, label: &str) -> Result<(), ValidationError> {
        let field_type = &self.field_type;

        if field_type.is_number() {
            let Some(number) = converted.as_f64() else {
                return Err(ValidationError::not_a_number(&self.name, label));
            };
            if field_type.is_integer() && number.fract() != 0.0 {
                return Err(ValidationError::not_an_integer(&self.name, label));
            }
            return self.check_bounds(number, Measure::Magnitude, label);
        }

        if field_type.is_array() && !converted.is_array() {
            return Err(ValidationError::not_an_array(&self.name, label));
        }

        if field_type.is_boolean() {
            return Ok(());
        }

        match converted {
            Value::String(text) => {
                self.check_bounds(text.chars().count() as f64, Measure::Characters, label)
            }
            Value::Array(items) => self.check_bounds(items.len() as f64, Measure::Items, label),
            Value::Number(number) => match number.as_f64() {
                Some(number) => self.check_bounds(number, Measure::Magnitude, label),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn check_bounds(&self, measured: f64, measure: Measure, label: &str) -> Result<(), ValidationError> {
        if measured < self.min {
            return Err(ValidationError::below_min(&self.name, label, self.min, measure));
        }
        match self.max {
            Some(max) if measured > max => {
                Err(ValidationError::above_max(&self.name, label, max, measure))
            }
            _ => Ok(()),
        }
    }

    fn check_items(&self, raw: &Value, label: &str, ctx: &ValidationContext) -> Result<(), ValidationError> {
        let (Some(item), Value::Array(elements)) = (&self.item_of, raw) else {
            return Ok(());
        };

        for (index, element) in elements.iter().enumerate() {
            let outcome = item.validate_in(Some(element), ctx);
            if !outcome.valid {
                let inner = outcome
                    .error
                    .unwrap_or_else(|| ValidationError::invalid(item.name(), item.label_or_name()));
                return Err(ValidationError::item(label, &self.name, index, inner));
            }
        }
        Ok(())
    }
}

impl Fieldable for Field {
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
        let outcome: Validation = match value {
            None | Some(Value::Null) if self.required => {
                Validation::fail(ValidationError::required(&self.name, self.label_or_name()))
            }
            None | Some(Value::Null) => Validation::ok(),
            Some(raw) => self.check(raw, ctx).into(),
        };
        trace!(field = %self.name, valid = outcome.valid, "validated field");
        outcome
    }

    fn convert_type_in(
        &self,
        value: Option<&Value>,
        ctx: &ValidationContext,
    ) -> Result<Option<Value>, CoercionError> {
        self.coerce(value, self.coercion, ctx)
    }

    fn get_default(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::resolve)
    }
}
