//! Field descriptors: the columns of an entity schema.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

// ─── Type descriptor ─────────────────────────────────────────────────────────

/// The storage type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldType {
  Bool,
  Int,
  Int64,
  Uint,
  Float,
  String,
  Text,
  Bytes,
  Time,
  Uuid,
  Json,
  /// A closed set of string values.
  Enum(Vec<String>),
  /// A host-defined type, referenced by its identifier.
  Other(String),
}

impl FieldType {
  /// The name used for this type in generated code and error messages.
  pub fn name(&self) -> &str {
    match self {
      Self::Bool => "bool",
      Self::Int => "int",
      Self::Int64 => "int64",
      Self::Uint => "uint",
      Self::Float => "float",
      Self::String => "string",
      Self::Text => "text",
      Self::Bytes => "bytes",
      Self::Time => "time",
      Self::Uuid => "uuid",
      Self::Json => "json",
      Self::Enum(_) => "enum",
      Self::Other(ident) => ident,
    }
  }
}

impl fmt::Display for FieldType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Position ────────────────────────────────────────────────────────────────

/// Where a field sits in its schema, and whether a mixin contributed it.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct Position {
  pub index:       usize,
  #[serde(default)]
  pub mixed_in:    bool,
  /// Index of the contributing mixin; meaningless unless `mixed_in`.
  #[serde(default)]
  pub mixin_index: usize,
}

impl Position {
  /// A position for a field declared directly on the schema.
  pub fn local(index: usize) -> Self {
    Self { index, mixed_in: false, mixin_index: 0 }
  }

  /// A position for a field contributed by the mixin at `mixin_index`.
  pub fn mixed_in(index: usize, mixin_index: usize) -> Self {
    Self { index, mixed_in: true, mixin_index }
  }
}

// ─── Default ─────────────────────────────────────────────────────────────────

/// A default applied when the field is not set on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldDefault {
  /// A literal value.
  Value(serde_json::Value),
  /// A named generator function, e.g. `"now"`.
  Func(String),
}

// ─── Field ───────────────────────────────────────────────────────────────────

/// A single field of a [`crate::schema::SchemaDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
  pub name:        String,
  #[serde(rename = "type")]
  pub field_type:  FieldType,
  #[serde(default)]
  pub nillable:    bool,
  #[serde(default)]
  pub immutable:   bool,
  #[serde(default)]
  pub optional:    bool,
  #[serde(default)]
  pub unique:      bool,
  #[serde(default)]
  pub sensitive:   bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default:     Option<FieldDefault>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub storage_key: Option<String>,
  #[serde(default)]
  pub comment:     String,
  #[serde(default)]
  pub position:    Position,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub annotations: BTreeMap<String, serde_json::Value>,
}

impl Field {
  /// A required, local field with every flag cleared.
  pub fn new(
    name: impl Into<String>,
    field_type: FieldType,
    index: usize,
  ) -> Self {
    Self {
      name: name.into(),
      field_type,
      nillable: false,
      immutable: false,
      optional: false,
      unique: false,
      sensitive: false,
      default: None,
      storage_key: None,
      comment: String::new(),
      position: Position::local(index),
      annotations: BTreeMap::new(),
    }
  }

  pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
    self.comment = comment.into();
    self
  }

  pub fn unique(mut self) -> Self {
    self.unique = true;
    self
  }

  pub fn optional(mut self) -> Self {
    self.optional = true;
    self
  }

  pub fn immutable(mut self) -> Self {
    self.immutable = true;
    self
  }

  pub fn with_default(mut self, default: FieldDefault) -> Self {
    self.default = Some(default);
    self
  }

  /// Mark the field as contributed by the mixin at `mixin_index`.
  pub fn mixed_in(mut self, mixin_index: usize) -> Self {
    self.position = Position::mixed_in(self.position.index, mixin_index);
    self
  }
}
