//! Generator configuration.
//!
//! Built either programmatically through the `with_*` methods or
//! deserialised from the CLI's TOML file.

use serde::{Deserialize, Serialize};

/// The value type of the `updated_by` history column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
  Int,
  String,
}

impl ValueType {
  /// Label used by the schema templates (`Int` / `String`).
  pub fn label(self) -> &'static str {
    match self {
      Self::Int => "Int",
      Self::String => "String",
    }
  }
}

/// Where the acting user is read from when recording `updated_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedBy {
  /// Context key the value is stored under, usually set by a middleware.
  pub key:        String,
  pub value_type: ValueType,
}

/// Overrides applied to every tracked (cloned) field. The three synthetic
/// history fields are never affected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProperties {
  #[serde(default)]
  pub nillable:  bool,
  #[serde(default)]
  pub immutable: bool,
}

/// Authorization settings for derived schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
  #[serde(default)]
  pub enabled:          bool,
  #[serde(default)]
  pub allowed_relation: String,
  /// Suppress policy emission on the very first pass, before the relations
  /// the policy refers to have been generated.
  #[serde(default)]
  pub first_run:        bool,
}

fn default_schema_path() -> String { "./schema".to_owned() }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
  #[serde(default = "default_schema_path")]
  pub schema_path:        String,
  /// Database schema (namespace) for the history tables.
  #[serde(default)]
  pub schema_name:        String,
  /// Emit the auditing template.
  #[serde(default)]
  pub auditing:           bool,
  /// Emit query support for the history schemas.
  #[serde(default)]
  pub query:              bool,
  #[serde(default)]
  pub history_time_index: bool,
  #[serde(default)]
  pub field_properties:   FieldProperties,
  #[serde(default)]
  pub updated_by:         Option<UpdatedBy>,
  #[serde(default)]
  pub auth:               AuthConfig,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      schema_path:        default_schema_path(),
      schema_name:        String::new(),
      auditing:           false,
      query:              false,
      history_time_index: false,
      field_properties:   FieldProperties::default(),
      updated_by:         None,
      auth:               AuthConfig::default(),
    }
  }
}

impl GeneratorConfig {
  pub fn with_schema_path(mut self, path: impl Into<String>) -> Self {
    self.schema_path = path.into();
    self
  }

  pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
    self.schema_name = name.into();
    self
  }

  pub fn with_auditing(mut self) -> Self {
    self.auditing = true;
    self
  }

  pub fn with_query(mut self) -> Self {
    self.query = true;
    self
  }

  pub fn with_history_time_index(mut self) -> Self {
    self.history_time_index = true;
    self
  }

  /// Make every tracked field nillable in history.
  pub fn with_nillable_fields(mut self) -> Self {
    self.field_properties.nillable = true;
    self
  }

  /// Make every tracked field immutable in history.
  pub fn with_immutable_fields(mut self) -> Self {
    self.field_properties.immutable = true;
    self
  }

  pub fn with_updated_by(
    mut self,
    key: impl Into<String>,
    value_type: ValueType,
  ) -> Self {
    self.updated_by = Some(UpdatedBy { key: key.into(), value_type });
    self
  }

  pub fn with_auth(mut self, allowed_relation: impl Into<String>) -> Self {
    self.auth.enabled = true;
    self.auth.allowed_relation = allowed_relation.into();
    self
  }

  pub fn with_first_run(mut self) -> Self {
    self.auth.first_run = true;
    self
  }
}
