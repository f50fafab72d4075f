//! File-system side of the annal generator: configuration, schema loading
//! and emission of rendered history schemas.

pub mod emit;
pub mod error;

pub use error::{Error, Result};

use std::path::Path;

use annal_core::{config::GeneratorConfig, schema::SchemaDefinition};
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_extension() -> String { "json".to_owned() }

/// Output settings for emitted files.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
  /// Extension of emitted history schema files.
  #[serde(default = "default_extension")]
  pub extension: String,
}

impl Default for OutputConfig {
  fn default() -> Self { Self { extension: default_extension() } }
}

/// Runtime configuration, deserialised from `annal.toml` and `ANNAL__*`
/// environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
  #[serde(default)]
  pub generator: GeneratorConfig,
  #[serde(default)]
  pub output:    OutputConfig,
}

// ─── Schema loading ──────────────────────────────────────────────────────────

/// Read a JSON array of schema definitions.
pub fn load_schemas(path: &Path) -> Result<Vec<SchemaDefinition>> {
  let raw = std::fs::read_to_string(path)?;
  Ok(serde_json::from_str(&raw)?)
}
