//! The capabilities a mutation and its executor must provide.

use std::future::Future;

use crate::Op;

/// A pending change to one entity type.
pub trait Mutation: Send + Sync {
  /// The kind of change, exactly one bit of [`Op`].
  fn op(&self) -> Op;
}

/// A mutation that knows how to write its own history rows.
///
/// Implemented per entity, usually by generated code. Each callback writes
/// one row to the entity's history table:
/// - `history_from_create` runs after the create and snapshots the persisted
///   row;
/// - `history_from_update` / `history_from_delete` run before the change and
///   snapshot every affected row as it is at that moment.
pub trait HistoryMutation: Mutation {
  type Error: std::error::Error + Send + Sync + 'static;

  fn history_from_create(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn history_from_update(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn history_from_delete(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Executes a mutation against the persistence layer.
pub trait Mutator<M: ?Sized>: Send + Sync {
  type Value: Send;
  type Error: Send;

  fn mutate<'a>(
    &'a self,
    mutation: &'a M,
  ) -> impl Future<Output = Result<Self::Value, Self::Error>> + Send + 'a;
}
