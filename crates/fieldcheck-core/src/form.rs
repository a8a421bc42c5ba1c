//! Forms: named top-level schemas validated and converted as one record.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::errors::{CoercionError, SchemaError, ValidationError, ValidationErrors};
use crate::schema::Schema;
use crate::validate::{Fieldable, ValidationContext};
use crate::value::kind_name;

/// Document formats accepted for schemas and records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Parse a document into a JSON value.
    pub fn parse(&self, text: &str) -> Result<Value, SchemaError> {
        let parsed = match self {
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| SchemaError::Parse {
            format: self.to_string(),
            message,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
            Format::Toml => write!(f, "toml"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown format: {}", s))
    }
}

/// Result of validating a whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormReport {
    pub valid: bool,
    /// One error per rejected field, in schema order. Errors raised inside a
    /// composite are qualified with the field name, e.g. `contact.email`.
    pub errors: ValidationErrors,
}

/// An ordered set of named schemas.
///
/// # Example
///
/// ```rust
/// use fieldcheck_core::{EngineConfig, Form, Format};
/// use serde_json::json;
///
/// let form = Form::from_str(
///     r#"{"password": {"type": "string", "min": 8},
///         "confirm": {"type": "string", "same": "password", "sameLabel": "Password"}}"#,
///     Format::Json,
///     &EngineConfig::default(),
/// )
/// .unwrap();
///
/// let record = json!({"password": "correct horse", "confirm": "correct horse"});
/// assert!(form.validate(record.as_object().unwrap()).valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: IndexMap<String, Schema>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form from a mapping of field name to schema definition.
    pub fn from_props(props: &Value, config: &EngineConfig) -> Result<Self, SchemaError> {
        let mut form = Form::new();
        let Some(map) = props.as_object() else {
            config.diagnose(SchemaError::NotAMapping {
                context: "form".to_string(),
                found: kind_name(props).to_string(),
            })?;
            return Ok(form);
        };

        for (name, definition) in map {
            let mut schema = Schema::from_props(definition, config)?;
            schema.name_if_unnamed(name);
            form.fields.insert(name.clone(), schema);
        }
        Ok(form)
    }

    /// Parse a schema document and build a form from it.
    pub fn from_str(text: &str, format: Format, config: &EngineConfig) -> Result<Self, SchemaError> {
        let props = format.parse(text)?;
        Self::from_props(&props, config)
    }

    /// Add a schema under its own name.
    pub fn with_field(mut self, schema: impl Into<Schema>) -> Self {
        let schema = schema.into();
        self.fields.insert(schema.name().to_string(), schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate every schema against its entry in `record`.
    ///
    /// Missing entries fall back to the field's own `value`. The whole record is
    /// visible to `same` constraints.
    #[instrument(level = "debug", skip_all, fields(fields = self.fields.len()))]
    pub fn validate(&self, record: &Map<String, Value>) -> FormReport {
        let ctx = ValidationContext::from_record(record);
        let mut errors = ValidationErrors::new();

        for (name, schema) in &self.fields {
            let value = record.get(name).or_else(|| schema.own_value());
            let outcome = schema.validate_in(value, &ctx);
            if !outcome.valid {
                let error = match (outcome.error, schema) {
                    (Some(error), Schema::Variable(_)) => error.with_path_prefix(name),
                    (Some(error), Schema::Field(_)) => error,
                    (None, _) => ValidationError::invalid(name.as_str(), schema.label_or_name()),
                };
                debug!(field = %name, error = %error, "field rejected");
                errors.push(error);
            }
        }

        FormReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Normalize a record: every schema converts its entry (or default), in schema
    /// order, followed by record entries no schema describes.
    #[instrument(level = "debug", skip_all, fields(fields = self.fields.len()))]
    pub fn convert(&self, record: &Map<String, Value>) -> Result<Map<String, Value>, CoercionError> {
        let ctx = ValidationContext::from_record(record);
        let mut converted = Map::new();

        for (name, schema) in &self.fields {
            let value = record.get(name).or_else(|| schema.own_value());
            if let Some(value) = schema.convert_type_with_default_in(value, &ctx)? {
                converted.insert(name.clone(), value);
            }
        }

        for (name, value) in record {
            if !self.fields.contains_key(name) {
                converted.insert(name.clone(), value.clone());
            }
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Rule;
    use crate::field::Field;
    use crate::types::FieldType;
    use crate::DefaultValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SIGNUP_YAML: &str = r#"
login:
  label: Login
  type: string
  min: 3
  max: 16
  pattern: "^[a-z0-9_]+$"
password:
  label: Password
  type: string
  min: 8
password_confirm:
  label: Confirmation
  type: string
  same: password
  sameLabel: Password
age:
  type: integer
  required: false
  min: 14
newsletter:
  type: boolean
  default: false
contact:
  type: oneOf
  fields:
    email:
      type: string
      pattern: "^[^@]+@[^@]+$"
    phone:
      type: string
      pattern: "^\\+[0-9]{7,15}$"
"#;

    fn signup() -> Form {
        Form::from_str(SIGNUP_YAML, Format::Yaml, &EngineConfig::default()).expect("signup form")
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_fields_keep_document_order() {
        let form = signup();
        let names: Vec<&String> = form.fields().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["login", "password", "password_confirm", "age", "newsletter", "contact"]
        );
        assert_eq!(form.get("age").map(|s| s.name()), Some("age"));
    }

    #[test]
    fn test_valid_record() {
        let report = signup().validate(&record(json!({
            "login": "neo_1",
            "password": "matrix123",
            "password_confirm": "matrix123",
            "newsletter": "yes",
            "contact": "neo@zion.io"
        })));
        assert!(report.valid, "{}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_invalid_record_reports_each_field() {
        let report = signup().validate(&record(json!({
            "login": "Neo",
            "password": "matrix123",
            "password_confirm": "matrix",
            "age": "12",
            "newsletter": true,
            "contact": "+1234567"
        })));
        assert!(!report.valid);

        let rules: Vec<(&str, Rule)> = report
            .errors
            .iter()
            .map(|e| (e.path.as_str(), e.rule))
            .collect();
        assert_eq!(
            rules,
            vec![
                ("login", Rule::Pattern),
                ("password_confirm", Rule::Same),
                ("age", Rule::Min),
            ]
        );
        assert_eq!(
            report.errors.for_path("password_confirm").map(|e| e.message.as_str()),
            Some("Confirmation must match Password")
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let report = signup().validate(&Map::new());
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["login", "password", "password_confirm", "newsletter", "contact.email"]
        );
    }

    #[test]
    fn test_composite_errors_name_the_field() {
        let form = Form::from_str(
            r#"{"payment": {"type": "oneOf", "fields": {
                "card": {"type": "string", "pattern": "^[0-9]{16}$"},
                "voucher": {"type": "string", "pattern": "^V-[A-Z0-9]+$"}}}}"#,
            Format::Json,
            &EngineConfig::default(),
        )
        .expect("form");

        let report = form.validate(&record(json!({"payment": "cash"})));
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["payment.card"]);
        assert_eq!(
            report.errors.for_path("payment.card").map(|e| e.rule),
            Some(Rule::Pattern)
        );

        let report = form.validate(&record(json!({"payment": "1234567812345678"})));
        assert!(report.valid, "{}", report.errors);
    }

    #[test]
    fn test_composite_base_error_keeps_field_path() {
        let form = Form::new().with_field(
            crate::VariableField::new("contact", crate::Combinator::AnyOf)
                .with_required(true)
                .with_variant(Field::new("email").with_type(FieldType::String).optional()),
        );
        let report = form.validate(&Map::new());
        assert_eq!(
            report.errors.for_path("contact").map(|e| e.rule),
            Some(Rule::Required)
        );
    }

    #[test]
    fn test_convert_record() {
        let converted = signup()
            .convert(&record(json!({
                "extra": 1,
                "age": "15",
                "login": 42,
                "contact": "neo@zion.io"
            })))
            .expect("lenient conversion");

        assert_eq!(
            Value::Object(converted),
            json!({
                "login": "42",
                "password": "",
                "password_confirm": "",
                "age": 15,
                "newsletter": false,
                "contact": "neo@zion.io",
                "extra": 1
            })
        );
    }

    #[test]
    fn test_own_value_is_used_when_record_is_silent() {
        let form = Form::new()
            .with_field(Field::new("country").with_type(FieldType::String).with_value(json!("NL")))
            .with_field(
                Field::new("created")
                    .with_type(FieldType::Number)
                    .optional()
                    .with_default(DefaultValue::computed(|| json!(1700000000))),
            );

        assert!(form.validate(&Map::new()).valid);
        let converted = form.convert(&Map::new()).expect("conversion");
        assert_eq!(converted.get("country"), Some(&json!("NL")));
        assert_eq!(converted.get("created"), Some(&json!(1700000000)));
    }

    #[test]
    fn test_strict_conversion_propagates() {
        let config = EngineConfig::default().with_coercion(crate::CoercionMode::Strict);
        let form = Form::from_str(r#"{"n": {"type": "number"}}"#, Format::Json, &config).expect("form");
        let error = form.convert(&record(json!({"n": "x"}))).expect_err("strict");
        assert!(matches!(error, CoercionError::NotANumber { .. }));
    }

    #[test]
    fn test_toml_schema() {
        let text = r#"
[title]
type = "string"
max = 5

[count]
type = "int"
"#;
        let form = Form::from_str(text, Format::Toml, &EngineConfig::default()).expect("form");
        assert_eq!(form.len(), 2);
        assert!(!form.validate(&record(json!({"title": "too long", "count": 1}))).valid);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Form::from_str("{", Format::Json, &EngineConfig::default()),
            Err(SchemaError::Parse { .. })
        ));
        assert!(Form::from_str("[1]", Format::Json, &EngineConfig::strict()).is_err());
        assert!(Form::from_str("[1]", Format::Json, &EngineConfig::default())
            .expect("permissive")
            .is_empty());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(Format::from_extension("YML"), Some(Format::Yaml));
        assert_eq!("toml".parse::<Format>(), Ok(Format::Toml));
        assert!("ini".parse::<Format>().is_err());
    }
}
