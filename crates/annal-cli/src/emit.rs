//! Rendering and writing of history schema files.
//!
//! Rendering goes through an explicitly constructed [`Renderer`] passed to
//! [`Emitter::new`]. There is no process-wide template state.

use std::path::{Path, PathBuf};

use annal_core::{config::GeneratorConfig, schema::SchemaDefinition};
use annal_schema::{Generation, RenderContext};
use tracing::{debug, info};

use crate::Result;

/// Name of the template that renders one history schema.
pub const SCHEMA_TEMPLATE: &str = "history_schema";

/// Names of the code-generation templates the host generator should load
/// for `config`.
pub fn templates(config: &GeneratorConfig) -> Vec<&'static str> {
  let mut names =
    vec!["history_from_mutation", "history_query", "history_client"];
  if config.auditing {
    names.push("auditing");
  }
  names
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Turns a render context into the text of a history schema file.
pub trait Renderer: Send + Sync {
  fn render(&self, context: &RenderContext) -> annal_core::Result<String>;
}

/// Renders each context as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
  fn render(&self, context: &RenderContext) -> annal_core::Result<String> {
    serde_json::to_string_pretty(context).map_err(|e| {
      annal_core::Error::TemplateGeneration(format!(
        "{SCHEMA_TEMPLATE} for {}: {e}",
        context.schema.name
      ))
    })
  }
}

// ─── Paths ───────────────────────────────────────────────────────────────────

/// `<absolute schema_path>/<lowercase name>_history.<extension>`.
pub fn history_schema_path(
  schema_path: &Path,
  schema_name: &str,
  extension: &str,
) -> Result<PathBuf> {
  let dir = std::path::absolute(schema_path)?;
  Ok(dir.join(format!(
    "{}_history.{extension}",
    schema_name.to_lowercase()
  )))
}

// ─── Emitter ─────────────────────────────────────────────────────────────────

pub struct Emitter {
  renderer:    Box<dyn Renderer>,
  schema_path: PathBuf,
  extension:   String,
}

impl Emitter {
  pub fn new(
    renderer: Box<dyn Renderer>,
    schema_path: impl Into<PathBuf>,
    extension: impl Into<String>,
  ) -> Self {
    Self {
      renderer,
      schema_path: schema_path.into(),
      extension: extension.into(),
    }
  }

  /// Delete previously generated history files for every schema in
  /// `schemas`. Missing files are not an error.
  pub fn remove_old_generated(
    &self,
    schemas: &[SchemaDefinition],
  ) -> Result<usize> {
    let mut removed = 0;
    for schema in schemas {
      let path =
        history_schema_path(&self.schema_path, &schema.name, &self.extension)?;
      match std::fs::remove_file(&path) {
        Ok(()) => {
          debug!(path = %path.display(), "removed stale history schema");
          removed += 1;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
      }
    }
    Ok(removed)
  }

  /// Render and write one file per render context. Returns the written
  /// paths in context order.
  pub fn emit(&self, generation: &Generation) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&self.schema_path)?;

    let mut written = Vec::with_capacity(generation.contexts.len());
    for context in &generation.contexts {
      let original = original_name(context);
      let path =
        history_schema_path(&self.schema_path, original, &self.extension)?;
      let body = self.renderer.render(context)?;
      std::fs::write(&path, body)?;
      written.push(path);
    }

    info!(count = written.len(), "wrote history schemas");
    Ok(written)
  }
}

/// Name of the schema a history context was derived from.
fn original_name(context: &RenderContext) -> &str {
  let name = context.schema.name.as_str();
  name.strip_suffix("History").unwrap_or(name)
}
