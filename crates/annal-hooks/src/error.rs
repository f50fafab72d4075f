//! Error types for `annal-hooks`.

use thiserror::Error;

use crate::Op;

#[derive(Debug, Error)]
pub enum Error {
  /// A type-erased mutation is not the entity mutation its hooks expect.
  #[error("expected {expected} in history hook, got a different {op} mutation")]
  TypedMutationMismatch { expected: &'static str, op: Op },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
