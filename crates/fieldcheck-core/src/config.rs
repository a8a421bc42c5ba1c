//! Engine configuration.
//!
//! ```toml
//! # fieldcheck.toml
//! coercion = "strict"        # or "lenient" (default)
//! construction = "permissive" # or "strict"
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{ConfigError, SchemaError};

/// What numeric coercion does with values that are not numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// Return the original value unchanged.
    #[default]
    Lenient,
    /// Fail with [`CoercionError`](crate::CoercionError).
    Strict,
}

/// What schema construction does with malformed props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructionMode {
    /// Log a warning and drop the offending key.
    #[default]
    Permissive,
    /// Fail with [`SchemaError`].
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub coercion: CoercionMode,
    pub construction: ConstructionMode,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict coercion and strict construction.
    pub fn strict() -> Self {
        Self {
            coercion: CoercionMode::Strict,
            construction: ConstructionMode::Strict,
        }
    }

    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercion = mode;
        self
    }

    pub fn with_construction(mut self, mode: ConstructionMode) -> Self {
        self.construction = mode;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Route a construction problem according to [`ConstructionMode`].
    pub(crate) fn diagnose(&self, error: SchemaError) -> Result<(), SchemaError> {
        match self.construction {
            ConstructionMode::Strict => Err(error),
            ConstructionMode::Permissive => {
                warn!("Ignoring schema props: {}", error);
                Ok(())
            }
        }
    }
}
