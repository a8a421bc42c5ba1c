//! Engine configuration for the CLI: config file first, then flag overrides.

use anyhow::{Context, Result};
use fieldcheck_core::{CoercionMode, ConstructionMode, EngineConfig};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fieldcheck.toml";

/// Load the engine configuration.
///
/// An explicit path must exist. Without one, `fieldcheck.toml` in `dir` is used
/// when present, otherwise the defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<EngineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                return Ok(EngineConfig::default());
            }
            candidate
        }
    };

    info!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    EngineConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Apply the `--strict-*` flags on top of a loaded configuration.
pub fn apply_overrides(
    config: EngineConfig,
    strict_schema: bool,
    strict_coercion: bool,
) -> EngineConfig {
    let mut config = config;
    if strict_schema {
        config = config.with_construction(ConstructionMode::Strict);
    }
    if strict_coercion {
        config = config.with_coercion(CoercionMode::Strict);
    }
    config
}
