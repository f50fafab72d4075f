//! Builds the history schema for a single entity.

use std::{collections::BTreeMap, path::Path};

use annal_core::{
  Error, Result,
  annotation::{AUTHZ_ANNOTATION, HISTORY_ANNOTATION, HistoryAnnotation},
  authz::AuthzPolicyDescriptor,
  config::GeneratorConfig,
  field::{Field, FieldDefault, FieldType},
  operation::Operation,
  schema::{ENT_SQL_ANNOTATION, Index, SchemaDefinition},
};
use convert_case::{Case, Casing};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
  clone::clone_fields,
  context::{IdType, RenderContext},
  policy::infer_policy,
};

pub const HISTORY_TABLE_SUFFIX: &str = "_history";

const HISTORY_TIME_FIELD: &str = "history_time";

/// A derived history schema and the context needed to render it.
#[derive(Debug, Clone)]
pub struct DerivedSchema {
  pub schema:  SchemaDefinition,
  pub context: RenderContext,
}

// ─── Inclusion ───────────────────────────────────────────────────────────────

/// The history annotation of `schema`; a malformed payload reads as empty.
pub(crate) fn history_annotation(
  schema: &SchemaDefinition,
) -> HistoryAnnotation {
  match HistoryAnnotation::from_schema(schema) {
    Ok(annotation) => annotation.unwrap_or_default(),
    Err(e) => {
      warn!(
        schema = %schema.name,
        "ignoring malformed History annotation: {e}"
      );
      HistoryAnnotation::default()
    }
  }
}

/// Whether a history schema should be derived for `schema`.
///
/// False for explicitly excluded schemas and for history schemas themselves;
/// true otherwise, including when the annotation is missing or unreadable.
pub fn should_generate(schema: &SchemaDefinition) -> bool {
  let annotation = history_annotation(schema);
  !(annotation.exclude || annotation.is_history)
}

// ─── Naming ──────────────────────────────────────────────────────────────────

/// Table name of `schema`: the `EntSQL` table annotation, else the
/// snake-cased schema name.
pub fn table_name(schema: &SchemaDefinition) -> String {
  schema
    .annotated_table()
    .map(str::to_owned)
    .unwrap_or_else(|| schema.name.to_case(Case::Snake))
}

/// The package name of the generated schema files: the last component of the
/// configured schema path.
pub fn package_name(schema_path: &str) -> Result<String> {
  Path::new(schema_path.trim_end_matches('/'))
    .file_name()
    .and_then(|name| name.to_str())
    .filter(|name| !name.is_empty())
    .map(str::to_owned)
    .ok_or_else(|| Error::InvalidSchemaPath(schema_path.to_owned()))
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// The three bookkeeping fields every history schema starts with.
fn synthetic_fields(id_type: IdType) -> Vec<Field> {
  let operations = Operation::ALL
    .iter()
    .map(|op| op.as_str().to_owned())
    .collect();

  vec![
    Field::new(HISTORY_TIME_FIELD, FieldType::Time, 0)
      .with_default(FieldDefault::Func("now".into()))
      .immutable(),
    Field::new("ref", id_type.field_type(), 1).immutable().optional(),
    Field::new("operation", FieldType::Enum(operations), 2).immutable(),
  ]
}

fn derived_annotations(
  table: &str,
  config: &GeneratorConfig,
  policy: &AuthzPolicyDescriptor,
) -> BTreeMap<String, serde_json::Value> {
  let mut annotations = BTreeMap::new();
  annotations.insert(
    ENT_SQL_ANNOTATION.to_owned(),
    json!({ "table": table, "schema": config.schema_name }),
  );
  annotations.insert(
    HISTORY_ANNOTATION.to_owned(),
    json!(HistoryAnnotation::derived()),
  );
  if policy.enabled {
    annotations.insert(
      AUTHZ_ANNOTATION.to_owned(),
      json!({
        "ObjectType": policy.object_type,
        "IDField": policy.id_field,
        "IncludeHooks": false,
      }),
    );
  }
  annotations
}

/// Derive the history schema of `schema`, whose primary key has type
/// `id_type`.
pub fn derive(
  schema: &SchemaDefinition,
  config: &GeneratorConfig,
  id_type: &FieldType,
) -> Result<DerivedSchema> {
  let id_type = IdType::resolve(id_type)?;
  let schema_pkg = package_name(&config.schema_path)?;
  let original_table_name = table_name(schema);
  let history_table = format!("{original_table_name}{HISTORY_TABLE_SUFFIX}");

  let mut fields = synthetic_fields(id_type);
  fields.extend(clone_fields(&schema.fields, config.field_properties)?);

  let mut indexes = Vec::new();
  if config.history_time_index {
    indexes.push(Index::on(&[HISTORY_TIME_FIELD]));
  }

  let policy = infer_policy(schema, &config.auth);

  let history = SchemaDefinition {
    name: format!("{}History", schema.name),
    fields,
    indexes,
    annotations: derived_annotations(&history_table, config, &policy),
    policy: None,
    id_type: Some(id_type.field_type()),
  };

  debug!(
    schema = %schema.name,
    table = %history_table,
    fields = history.fields.len(),
    authz = policy.enabled,
    "derived history schema"
  );

  let context = RenderContext {
    schema: history.clone(),
    id_type,
    schema_pkg,
    table_name: history_table,
    schema_name: config.schema_name.clone(),
    query: config.query,
    original_table_name,
    with_updated_by: config.updated_by.is_some(),
    updated_by_value_type: config
      .updated_by
      .as_ref()
      .map(|u| u.value_type.label().to_owned())
      .unwrap_or_default(),
    with_history_time_index: config.history_time_index,
    authz_policy: policy,
    add_policy: !config.auth.first_run,
  };

  Ok(DerivedSchema { schema: history, context })
}
