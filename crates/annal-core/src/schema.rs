//! Schema definitions: the entities a generation run operates on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldType};

/// Annotation key holding SQL storage options (`table`, `schema`).
pub const ENT_SQL_ANNOTATION: &str = "EntSQL";

/// An index over one or more fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
  pub fields: Vec<String>,
  #[serde(default)]
  pub unique: bool,
}

impl Index {
  pub fn on(fields: &[&str]) -> Self {
    Self {
      fields: fields.iter().map(|f| (*f).to_owned()).collect(),
      unique: false,
    }
  }
}

/// A declared entity schema.
///
/// Loaded once per generation run and never mutated; derivation produces a
/// new, separate schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
  pub name:        String,
  #[serde(default)]
  pub fields:      Vec<Field>,
  #[serde(default)]
  pub indexes:     Vec<Index>,
  #[serde(default)]
  pub annotations: BTreeMap<String, serde_json::Value>,
  /// Identifier of a privacy policy declared on the schema itself.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub policy:      Option<String>,
  /// Type of the primary key. Present for entities only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id_type:     Option<FieldType>,
}

impl SchemaDefinition {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:        name.into(),
      fields:      Vec::new(),
      indexes:     Vec::new(),
      annotations: BTreeMap::new(),
      policy:      None,
      id_type:     None,
    }
  }

  /// Append `field`, which is expected to carry the next position index.
  pub fn with_field(mut self, field: Field) -> Self {
    self.fields.push(field);
    self
  }

  pub fn with_id_type(mut self, id_type: FieldType) -> Self {
    self.id_type = Some(id_type);
    self
  }

  pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
    self.policy = Some(policy.into());
    self
  }

  pub fn with_annotation(
    mut self,
    name: impl Into<String>,
    payload: serde_json::Value,
  ) -> Self {
    self.annotations.insert(name.into(), payload);
    self
  }

  /// Look up a field by name.
  pub fn field(&self, name: &str) -> Option<&Field> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn has_field(&self, name: &str) -> bool { self.field(name).is_some() }

  /// The table name set through the `EntSQL` annotation, if any.
  pub fn annotated_table(&self) -> Option<&str> {
    self
      .annotations
      .get(ENT_SQL_ANNOTATION)?
      .get("table")?
      .as_str()
      .filter(|t| !t.is_empty())
  }
}
