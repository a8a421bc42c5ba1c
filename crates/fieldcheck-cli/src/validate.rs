//! Command implementations for checking schemas and validating records

use anyhow::Result;
use fieldcheck_core::{EngineConfig, Fieldable, Form, FormReport, Format, Schema};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

use crate::document::{load_form, load_record};

/// One line of the `check` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub kind: String,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<FieldSummary>,
}

impl FieldSummary {
    pub fn from_schema(schema: &Schema) -> Self {
        let (required, variants) = match schema {
            Schema::Field(field) => (field.required, Vec::new()),
            Schema::Variable(variable) => (
                variable.base_field().is_some_and(|base| base.required),
                variable.fields.values().map(Self::from_schema).collect(),
            ),
        };
        Self {
            name: schema.name().to_string(),
            kind: schema.kind(),
            label: schema.label_or_name().to_string(),
            required,
            variants,
        }
    }
}

/// Load a schema document and describe the fields it declares.
pub fn run_check(schema_path: &Path, config: &EngineConfig) -> Result<Vec<FieldSummary>> {
    let form = load_form(schema_path, config)?;
    if form.is_empty() {
        warn!("Schema {} declares no fields", schema_path.display());
    }
    Ok(form.fields().map(|(_, schema)| FieldSummary::from_schema(schema)).collect())
}

/// Validate a record against a schema document.
pub fn run_validate(
    schema_path: &Path,
    input: Option<&Path>,
    input_format: Option<Format>,
    config: &EngineConfig,
) -> Result<FormReport> {
    let form = load_form(schema_path, config)?;
    let record = load_record(input, input_format)?;
    let report = validate_record(&form, &record);
    if report.valid {
        info!("Record is valid");
    } else {
        info!("Record rejected with {} errors", report.errors.len());
    }
    Ok(report)
}

/// Convert a record to the types a schema document declares.
pub fn run_convert(
    schema_path: &Path,
    input: Option<&Path>,
    input_format: Option<Format>,
    config: &EngineConfig,
) -> Result<Map<String, Value>> {
    let form = load_form(schema_path, config)?;
    let record = load_record(input, input_format)?;
    Ok(form.convert(&record)?)
}

pub fn validate_record(form: &Form, record: &Map<String, Value>) -> FormReport {
    let report = form.validate(record);
    for error in &report.errors {
        warn!("{}: {}", error.path, error);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcheck_core::{Combinator, Field, FieldType, VariableField};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_of_leaf() {
        let schema: Schema = Field::new("age")
            .with_type(FieldType::Integer)
            .with_label("Age")
            .optional()
            .into();
        assert_eq!(
            FieldSummary::from_schema(&schema),
            FieldSummary {
                name: "age".to_string(),
                kind: "integer".to_string(),
                label: "Age".to_string(),
                required: false,
                variants: Vec::new(),
            }
        );
    }

    #[test]
    fn test_summary_of_composite() {
        let schema: Schema = VariableField::new("contact", Combinator::OneOf)
            .with_variant(Field::new("email").with_type(FieldType::String))
            .with_variant(Field::new("phone").with_type(FieldType::String))
            .into();
        let summary = FieldSummary::from_schema(&schema);
        assert_eq!(summary.kind, "oneOf");
        assert!(!summary.required);
        let names: Vec<&str> = summary.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["email", "phone"]);
    }
}
