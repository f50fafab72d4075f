//! Operation-filtered history interceptors.

use std::future::Future;

use tracing::debug;

use crate::{HistoryMutation, Mutator, Op};

/// Which history callback a hook invokes, and therefore its ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
  Create,
  Update,
  Delete,
}

/// One history interceptor, active only for mutations whose op intersects
/// its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryHook {
  kind:   Kind,
  target: Op,
}

impl HistoryHook {
  pub fn target(&self) -> Op { self.target }

  /// Wrap `next` so mutations matching this hook also record history.
  pub fn wrap<N>(self, next: N) -> Intercept<N> {
    Intercept { hook: self, next }
  }

  /// Run `next` (the underlying mutation) and the history callback for
  /// `mutation` in this hook's order. `next` is lazy and only starts when
  /// awaited here.
  pub(crate) async fn run<M, V, E, F>(
    self,
    mutation: &M,
    next: F,
  ) -> Result<V, E>
  where
    M: HistoryMutation,
    E: From<M::Error>,
    F: Future<Output = Result<V, E>>,
  {
    debug!(op = %mutation.op(), hook = ?self.kind, "recording history");
    match self.kind {
      Kind::Create => {
        let value = next.await?;
        mutation.history_from_create().await?;
        Ok(value)
      }
      Kind::Update => {
        mutation.history_from_update().await?;
        next.await
      }
      Kind::Delete => {
        mutation.history_from_delete().await?;
        next.await
      }
    }
  }
}

/// The three history hooks of an entity, outermost first.
pub fn history_hooks() -> [HistoryHook; 3] {
  [
    HistoryHook { kind: Kind::Create, target: Op::CREATE },
    HistoryHook { kind: Kind::Update, target: Op::UPDATE | Op::UPDATE_ONE },
    HistoryHook { kind: Kind::Delete, target: Op::DELETE | Op::DELETE_ONE },
  ]
}

/// Compose all three history hooks around `next`.
pub fn with_history<N>(next: N) -> Intercept<Intercept<Intercept<N>>> {
  let [create, update, delete] = history_hooks();
  create.wrap(update.wrap(delete.wrap(next)))
}

/// A mutator wrapped by one [`HistoryHook`].
#[derive(Debug, Clone)]
pub struct Intercept<N> {
  hook: HistoryHook,
  next: N,
}

impl<N> Intercept<N> {
  pub fn hook(&self) -> HistoryHook { self.hook }

  pub fn inner(&self) -> &N { &self.next }

  pub fn into_inner(self) -> N { self.next }
}

impl<M, N> Mutator<M> for Intercept<N>
where
  M: HistoryMutation,
  N: Mutator<M>,
  N::Error: From<M::Error>,
{
  type Error = N::Error;
  type Value = N::Value;

  fn mutate<'a>(
    &'a self,
    mutation: &'a M,
  ) -> impl Future<Output = Result<Self::Value, Self::Error>> + Send + 'a {
    async move {
      if !mutation.op().is(self.hook.target) {
        return self.next.mutate(mutation).await;
      }
      self.hook.run(mutation, self.next.mutate(mutation)).await
    }
  }
}
