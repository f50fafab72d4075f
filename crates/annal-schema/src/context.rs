//! Render context handed to the code generator for each derived schema.

use annal_core::{
  Error, Result, authz::AuthzPolicyDescriptor, field::FieldType,
  schema::SchemaDefinition,
};
use serde::Serialize;

/// Primary key kinds a history schema can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
  Int,
  String,
}

impl IdType {
  /// Resolve the id type of an entity; only int and string keys are
  /// supported.
  pub fn resolve(field_type: &FieldType) -> Result<Self> {
    match field_type {
      FieldType::Int => Ok(Self::Int),
      FieldType::String => Ok(Self::String),
      other => Err(Error::UnsupportedIdType(other.name().to_owned())),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Int => "int",
      Self::String => "string",
    }
  }

  pub fn field_type(self) -> FieldType {
    match self {
      Self::Int => FieldType::Int,
      Self::String => FieldType::String,
    }
  }
}

/// Everything a template needs to emit one history schema.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
  /// The derived history schema.
  pub schema:                  SchemaDefinition,
  pub id_type:                 IdType,
  /// Package (module) name the schema file belongs to.
  pub schema_pkg:              String,
  pub table_name:              String,
  /// Database schema (namespace) of the history table; may be empty.
  pub schema_name:             String,
  pub query:                   bool,
  pub original_table_name:     String,
  pub with_updated_by:         bool,
  /// `Int` or `String`; empty when `with_updated_by` is false.
  pub updated_by_value_type:   String,
  pub with_history_time_index: bool,
  pub authz_policy:            AuthzPolicyDescriptor,
  /// False on the first generation pass, when the relations a policy refers
  /// to do not exist yet.
  pub add_policy:              bool,
}
