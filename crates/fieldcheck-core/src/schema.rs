//! A schema node: either a leaf [`Field`] or a composite [`VariableField`].

use serde_json::Value;

use crate::config::EngineConfig;
use crate::errors::{CoercionError, SchemaError};
use crate::field::Field;
use crate::types::Combinator;
use crate::validate::{Fieldable, Validation, ValidationContext};
use crate::variable::VariableField;

#[derive(Debug, Clone)]
pub enum Schema {
    Field(Field),
    Variable(VariableField),
}

impl Schema {
    /// Build a schema node from props.
    ///
    /// Props with a `fields` key, or whose `type` is `oneOf`/`anyOf`/`allOf`,
    /// describe a composite; everything else is a leaf field.
    pub fn from_props(props: &Value, config: &EngineConfig) -> Result<Self, SchemaError> {
        if Self::is_composite(props) {
            VariableField::from_props(props, config).map(Schema::Variable)
        } else {
            Field::from_props(props, config).map(Schema::Field)
        }
    }

    fn is_composite(props: &Value) -> bool {
        let Some(map) = props.as_object() else {
            return false;
        };
        map.contains_key("fields")
            || map
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|name| Combinator::from_name(name).is_known())
    }

    pub(crate) fn name_if_unnamed(&mut self, name: &str) {
        let current = match self {
            Schema::Field(field) => &mut field.name,
            Schema::Variable(variable) => &mut variable.name,
        };
        if current.is_empty() {
            *current = name.to_string();
        }
    }

    /// The node's own value. Only leaf fields carry one.
    pub fn own_value(&self) -> Option<&Value> {
        match self {
            Schema::Field(field) => field.value.as_ref(),
            Schema::Variable(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Schema::Field(field) => Some(field),
            Schema::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableField> {
        match self {
            Schema::Field(_) => None,
            Schema::Variable(variable) => Some(variable),
        }
    }

    /// Short description of the node: the field type or the combinator kind.
    pub fn kind(&self) -> String {
        match self {
            Schema::Field(field) => field.field_type.to_string(),
            Schema::Variable(variable) => variable.combinator.to_string(),
        }
    }
}

impl From<Field> for Schema {
    fn from(field: Field) -> Self {
        Schema::Field(field)
    }
}

impl From<VariableField> for Schema {
    fn from(variable: VariableField) -> Self {
        Schema::Variable(variable)
    }
}

impl Fieldable for Schema {
    fn name(&self) -> &str {
        match self {
            Schema::Field(field) => field.name(),
            Schema::Variable(variable) => variable.name(),
        }
    }

    fn label(&self) -> Option<&str> {
        match self {
            Schema::Field(field) => field.label(),
            Schema::Variable(variable) => variable.label(),
        }
    }

    fn same(&self) -> Option<&str> {
        match self {
            Schema::Field(field) => field.same(),
            Schema::Variable(variable) => variable.same(),
        }
    }

    fn same_label(&self) -> Option<&str> {
        match self {
            Schema::Field(field) => field.same_label(),
            Schema::Variable(variable) => variable.same_label(),
        }
    }

    fn validate_in(&self, value: Option<&Value>, ctx: &ValidationContext) -> Validation {
        match self {
            Schema::Field(field) => field.validate_in(value, ctx),
            Schema::Variable(variable) => variable.validate_in(value, ctx),
        }
    }

    fn convert_type_in(
        &self,
        value: Option<&Value>,
        ctx: &ValidationContext,
    ) -> Result<Option<Value>, CoercionError> {
        match self {
            Schema::Field(field) => field.convert_type_in(value, ctx),
            Schema::Variable(variable) => variable.convert_type_in(value, ctx),
        }
    }

    fn get_default(&self) -> Option<Value> {
        match self {
            Schema::Field(field) => field.get_default(),
            Schema::Variable(variable) => variable.get_default(),
        }
    }
}
