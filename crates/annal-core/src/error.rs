//! Error types for `annal-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported id type {0:?}, only int and string are allowed")]
  UnsupportedIdType(String),

  #[error("unsupported type for field {field:?}: {reason}")]
  UnsupportedType { field: String, reason: String },

  #[error("could not get id type for schema: {0}")]
  NoIdType(String),

  #[error("invalid schema path {0:?}, unable to find package name in path")]
  InvalidSchemaPath(String),

  #[error("failed to generate template: {0}")]
  TemplateGeneration(String),

  #[error("derivation task failed: {0}")]
  TaskFailed(String),

  #[error("annotation error: {0}")]
  Annotation(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
