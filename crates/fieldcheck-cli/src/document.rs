//! Reading schema and record documents from files or stdin.

use anyhow::{Context, Result};
use fieldcheck_core::{EngineConfig, Form, Format};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Infer a document format from the file extension.
pub fn detect_format(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .with_context(|| format!("Cannot infer format of {}: no extension", path.display()))?;
    Format::from_extension(extension)
        .with_context(|| format!("Unsupported file extension: .{}", extension))
}

/// Load a form from a schema document.
pub fn load_form(path: &Path, config: &EngineConfig) -> Result<Form> {
    let format = detect_format(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    let form = Form::from_str(&content, format, config)
        .with_context(|| format!("Invalid schema file {}", path.display()))?;
    info!("Loaded {} fields from {}", form.len(), path.display());
    Ok(form)
}

/// Load a record from a file, or from stdin when no path is given.
///
/// `format` overrides the extension; stdin defaults to JSON.
pub fn load_record(path: Option<&Path>, format: Option<Format>) -> Result<Map<String, Value>> {
    let (content, format) = match path {
        Some(path) => {
            let format = match format {
                Some(format) => format,
                None => detect_format(path)?,
            };
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()))?;
            (content, format)
        }
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read input from stdin")?;
            (content, format.unwrap_or(Format::Json))
        }
    };
    parse_record(&content, format)
}

/// Parse a record document. The top level must be a mapping.
pub fn parse_record(content: &str, format: Format) -> Result<Map<String, Value>> {
    match format.parse(content)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!(
            "Input record must be a mapping of field names to values, got {}",
            fieldcheck_core::value::kind_name(&other)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("form.yml")).ok(), Some(Format::Yaml));
        assert_eq!(detect_format(Path::new("form.JSON")).ok(), Some(Format::Json));
        assert!(detect_format(Path::new("form")).is_err());
        assert!(detect_format(Path::new("form.ini")).is_err());
    }

    #[test]
    fn test_parse_record() -> Result<()> {
        let record = parse_record("name: neo\nage: 30\n", Format::Yaml)?;
        assert_eq!(record.get("age"), Some(&json!(30)));
        assert!(parse_record("[1, 2]", Format::Json).is_err());
        Ok(())
    }

    #[test]
    fn test_load_record_with_format_override() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("record.txt");
        fs::write(&path, "{\"a\": 1}")?;
        let record = load_record(Some(&path), Some(Format::Json))?;
        assert_eq!(record.get("a"), Some(&json!(1)));
        assert!(load_record(Some(&path), None).is_err());
        Ok(())
    }
}
