//! History hooks for type-erased mutation chains.
//!
//! Prefer [`crate::with_history`], which checks the mutation type at compile
//! time. Chains that carry `dyn DynMutation` (one executor shared by several
//! entities) use [`with_history_erased`] instead: the mutation is downcast to
//! the entity's concrete type before anything runs, and a mismatch fails the
//! operation without touching either the history table or the entity table.

use std::{any::Any, future::Future, marker::PhantomData};

use crate::{
  Error, HistoryHook, HistoryMutation, Mutation, Mutator, history_hooks,
};

/// A mutation whose concrete type is only known at runtime.
pub trait DynMutation: Mutation + Any {
  fn as_any(&self) -> &dyn Any;
}

impl<T: Mutation + Any> DynMutation for T {
  fn as_any(&self) -> &dyn Any { self }
}

/// Downcast `mutation` to the entity mutation `T`.
pub fn typed_mutation<T>(mutation: &dyn DynMutation) -> Result<&T, Error>
where
  T: HistoryMutation + 'static,
{
  mutation.as_any().downcast_ref::<T>().ok_or_else(|| {
    Error::TypedMutationMismatch {
      expected: std::any::type_name::<T>(),
      op:       mutation.op(),
    }
  })
}

/// A type-erased mutator wrapped by one [`HistoryHook`] for entity `T`.
pub struct ErasedIntercept<T, N> {
  hook:    HistoryHook,
  next:    N,
  _entity: PhantomData<fn() -> T>,
}

impl<T, N> ErasedIntercept<T, N> {
  pub fn new(hook: HistoryHook, next: N) -> Self {
    Self { hook, next, _entity: PhantomData }
  }

  pub fn inner(&self) -> &N { &self.next }
}

/// Compose all three history hooks for entity `T` around `next`.
pub fn with_history_erased<T, N>(
  next: N,
) -> ErasedIntercept<T, ErasedIntercept<T, ErasedIntercept<T, N>>> {
  let [create, update, delete] = history_hooks();
  ErasedIntercept::new(
    create,
    ErasedIntercept::new(update, ErasedIntercept::new(delete, next)),
  )
}

impl<T, N> Mutator<dyn DynMutation> for ErasedIntercept<T, N>
where
  T: HistoryMutation + 'static,
  N: Mutator<dyn DynMutation>,
  N::Error: From<T::Error> + From<Error>,
{
  type Error = N::Error;
  type Value = N::Value;

  fn mutate<'a>(
    &'a self,
    mutation: &'a dyn DynMutation,
  ) -> impl Future<Output = Result<Self::Value, Self::Error>> + Send + 'a {
    async move {
      if !mutation.op().is(self.hook.target()) {
        return self.next.mutate(mutation).await;
      }
      let typed = typed_mutation::<T>(mutation)?;
      self.hook.run(typed, self.next.mutate(mutation)).await
    }
  }
}
