//! Fans derivation out over a whole schema set.
//!
//! Each schema is derived on its own blocking task. Results flow back through
//! the [`JoinSet`] to a single collector, which is the only code that touches
//! the output. The merged set is sorted by name at the end, so the output is
//! the same no matter in which order the tasks finish.

use std::sync::Arc;

use annal_core::{
  Error, Result, config::GeneratorConfig, schema::SchemaDefinition,
};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::{
  context::RenderContext,
  derive::{DerivedSchema, derive, history_annotation},
};

/// The outcome of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
  /// Original and derived schemas, sorted by name.
  pub schemas:  Vec<SchemaDefinition>,
  /// One context per derived schema, sorted by derived schema name.
  pub contexts: Vec<RenderContext>,
}

/// What a single task decided for its schema.
enum Planned {
  /// A previously generated history schema; it is regenerated from its
  /// source entity instead.
  Dropped,
  /// Excluded from history tracking; passed through unchanged.
  Kept(SchemaDefinition),
  Derived(SchemaDefinition, Box<DerivedSchema>),
}

fn plan(schema: SchemaDefinition, config: &GeneratorConfig) -> Result<Planned> {
  let annotation = history_annotation(&schema);

  if annotation.is_history {
    debug!(schema = %schema.name, "dropping stale history schema");
    return Ok(Planned::Dropped);
  }

  if annotation.exclude {
    debug!(schema = %schema.name, "history excluded");
    return Ok(Planned::Kept(schema));
  }

  let id_type = schema
    .id_type
    .as_ref()
    .ok_or_else(|| Error::NoIdType(schema.name.clone()))?;

  let derived = derive(&schema, config, id_type)?;
  Ok(Planned::Derived(schema, Box::new(derived)))
}

/// Derive history schemas for every includable schema in `schemas`.
///
/// Either the whole run succeeds or the first error is returned; remaining
/// tasks are aborted and no partial set escapes.
pub async fn generate(
  schemas: Vec<SchemaDefinition>,
  config: GeneratorConfig,
) -> Result<Generation> {
  let config = Arc::new(config);
  let total = schemas.len();

  let mut tasks = JoinSet::new();
  for schema in schemas {
    let config = Arc::clone(&config);
    tasks.spawn_blocking(move || plan(schema, &config));
  }

  let mut out = Vec::with_capacity(total * 2);
  let mut contexts = Vec::new();

  while let Some(joined) = tasks.join_next().await {
    let planned = joined.map_err(|e| Error::TaskFailed(e.to_string()))??;

    match planned {
      Planned::Dropped => {}
      Planned::Kept(schema) => out.push(schema),
      Planned::Derived(schema, derived) => {
        let derived = *derived;
        out.push(schema);
        out.push(derived.schema);
        contexts.push(derived.context);
      }
    }
  }

  out.sort_by(|a, b| a.name.cmp(&b.name));
  contexts.sort_by(|a, b| a.schema.name.cmp(&b.schema.name));

  info!(
    input = total,
    schemas = out.len(),
    derived = contexts.len(),
    "generated history schemas"
  );

  Ok(Generation { schemas: out, contexts })
}
