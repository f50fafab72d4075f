//! Typed views over the free-form annotation payloads of a schema.
//!
//! Annotations arrive as arbitrary JSON keyed by annotation name. The two the
//! generator cares about are decoded here; anything that fails to decode is
//! reported to the caller, which decides how permissive to be.

use serde::{Deserialize, Serialize};

use crate::{Result, schema::SchemaDefinition};

/// Annotation key for [`HistoryAnnotation`].
pub const HISTORY_ANNOTATION: &str = "History";

/// Annotation key for [`AuthzAnnotation`].
pub const AUTHZ_ANNOTATION: &str = "Authz";

/// Controls whether a history schema is derived for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryAnnotation {
  /// Skip history tracking for this schema.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub exclude:    bool,
  /// Set only on derived history schemas; they are never re-derived.
  #[serde(
    default,
    rename = "isHistory",
    skip_serializing_if = "std::ops::Not::not"
  )]
  pub is_history: bool,
}

impl HistoryAnnotation {
  /// The annotation placed on every derived schema.
  pub fn derived() -> Self { Self { exclude: true, is_history: true } }

  /// Decode the annotation from `schema`. `Ok(None)` when absent.
  pub fn from_schema(schema: &SchemaDefinition) -> Result<Option<Self>> {
    decode(schema, HISTORY_ANNOTATION)
  }
}

/// Authorization settings declared by the external authorization layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthzAnnotation {
  #[serde(default)]
  pub object_type:       String,
  #[serde(default, rename = "IDField")]
  pub id_field:          String,
  #[serde(default, rename = "NillableIDField")]
  pub nillable_id_field: bool,
  #[serde(default)]
  pub allowed_relation:  String,
  #[serde(default)]
  pub include_hooks:     bool,
}

impl AuthzAnnotation {
  /// Decode the annotation from `schema`. `Ok(None)` when absent.
  pub fn from_schema(schema: &SchemaDefinition) -> Result<Option<Self>> {
    decode(schema, AUTHZ_ANNOTATION)
  }
}

fn decode<T: for<'de> Deserialize<'de>>(
  schema: &SchemaDefinition,
  key: &str,
) -> Result<Option<T>> {
  match schema.annotations.get(key) {
    None => Ok(None),
    Some(payload) => Ok(Some(serde_json::from_value(payload.clone())?)),
  }
}
