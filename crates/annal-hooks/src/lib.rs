//! Runtime history hooks.
//!
//! Wraps an entity's [`Mutator`] so every create, update and delete also
//! writes a history row through the entity's [`HistoryMutation`] callbacks:
//!
//! - create: the mutation runs first, then history is recorded from the
//!   persisted row (generated ids and timestamps are only known afterwards);
//! - update / delete: history is recorded first, from the row as it is about
//!   to be overwritten or removed, then the mutation runs.
//!
//! The two writes are not atomic. If either fails the error is returned to
//! the caller as is, and the half that already ran is not undone.
//!
//! ```rust,ignore
//! let mutator = annal_hooks::with_history(InvoiceStore::new(conn));
//! mutator.mutate(&InvoiceMutation::create(42)).await?;
//! ```

pub mod erased;
pub mod error;
mod hook;
mod mutation;
mod op;
mod record;

pub use error::{Error, Result};
pub use hook::{HistoryHook, Intercept, history_hooks, with_history};
pub use mutation::{HistoryMutation, Mutation, Mutator};
pub use op::Op;
pub use record::HistoryRecord;

#[cfg(test)]
mod tests;
