//! Fieldcheck Core
//!
//! Declarative field validation and type coercion:
//!
//! - **Field**: a leaf schema with type, bounds, pattern, options, cross-field
//!   equality and a default value
//! - **VariableField**: a composite combining variants with `oneOf`, `anyOf` or `allOf`
//! - **Form**: named schemas validated and converted as one record
//!
//! # Example
//!
//! ```rust
//! use fieldcheck_core::{EngineConfig, Fieldable, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::from_props(
//!     &json!({
//!         "name": "amount",
//!         "type": "anyOf",
//!         "fields": {
//!             "exact": {"type": "number", "min": 1},
//!             "keyword": {"type": "string", "options": ["all", "none"]}
//!         }
//!     }),
//!     &EngineConfig::default(),
//! )?;
//!
//! assert!(schema.is_valid(Some(&json!("12.5"))));
//! assert!(schema.is_valid(Some(&json!("all"))));
//! assert!(!schema.is_valid(Some(&json!("some"))));
//! assert_eq!(schema.convert_type(Some(&json!("12.5")))?, Some(json!(12.5)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod default;
mod errors;
mod field;
mod form;
mod props;
mod schema;
mod types;
mod validate;
mod variable;

pub mod value;

// Re-export public types
pub use config::{CoercionMode, ConstructionMode, EngineConfig};
pub use default::{DefaultValue, COMPUTED_KEY};
pub use errors::{
    CoercionError, ConfigError, Measure, Rule, SchemaError, ValidationError, ValidationErrors,
    ONE_VALID_VARIANT,
};
pub use field::Field;
pub use form::{Form, FormReport, Format};
pub use schema::Schema;
pub use types::{Combinator, FieldType, Options, Pattern};
pub use validate::{Fieldable, Validation, ValidationContext};
pub use variable::VariableField;
