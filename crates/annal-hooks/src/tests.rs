//! Hook ordering and failure tests.
//!
//! The first half uses a scripted mutation that logs every step; the second
//! half runs the hooks against an in-memory SQLite database and checks the
//! history rows that end up on disk.

use std::{
  future::Future,
  sync::{Arc, Mutex, OnceLock},
};

use annal_core::operation::Operation;
use rusqlite::OptionalExtension as _;
use thiserror::Error;

use crate::{
  Error, HistoryMutation, HistoryRecord, Mutation, Mutator, Op,
  erased::{DynMutation, ErasedIntercept, with_history_erased},
  with_history,
};

// ─── Scripted mutation ───────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
enum TestError {
  #[error("history write failed")]
  History,
  #[error("mutation failed")]
  Mutation,
  #[error("hook error: {0}")]
  Hook(String),
}

impl From<Error> for TestError {
  fn from(e: Error) -> Self { Self::Hook(e.to_string()) }
}

type Log = Arc<Mutex<Vec<&'static str>>>;

struct Scripted {
  op:           Op,
  log:          Log,
  fail_history: bool,
}

impl Scripted {
  fn new(op: Op) -> Self {
    Self { op, log: Log::default(), fail_history: false }
  }

  fn failing_history(mut self) -> Self {
    self.fail_history = true;
    self
  }

  fn steps(&self) -> Vec<&'static str> { self.log.lock().unwrap().clone() }

  async fn record(&self, step: &'static str) -> Result<(), TestError> {
    if self.fail_history {
      return Err(TestError::History);
    }
    self.log.lock().unwrap().push(step);
    Ok(())
  }
}

impl Mutation for Scripted {
  fn op(&self) -> Op { self.op }
}

impl HistoryMutation for Scripted {
  type Error = TestError;

  fn history_from_create(
    &self,
  ) -> impl Future<Output = Result<(), TestError>> + Send + '_ {
    self.record("history:create")
  }

  fn history_from_update(
    &self,
  ) -> impl Future<Output = Result<(), TestError>> + Send + '_ {
    self.record("history:update")
  }

  fn history_from_delete(
    &self,
  ) -> impl Future<Output = Result<(), TestError>> + Send + '_ {
    self.record("history:delete")
  }
}

/// Underlying executor; logs into the mutation's log so ordering is visible.
#[derive(Default)]
struct Executor {
  fail: bool,
}

impl Mutator<Scripted> for Executor {
  type Error = TestError;
  type Value = u32;

  fn mutate<'a>(
    &'a self,
    mutation: &'a Scripted,
  ) -> impl Future<Output = Result<u32, TestError>> + Send + 'a {
    async move {
      if self.fail {
        return Err(TestError::Mutation);
      }
      mutation.log.lock().unwrap().push("mutate");
      Ok(7)
    }
  }
}

#[tokio::test]
async fn create_records_after_mutation() {
  let m = Scripted::new(Op::CREATE);
  let value = with_history(Executor::default()).mutate(&m).await.unwrap();
  assert_eq!(value, 7);
  assert_eq!(m.steps(), ["mutate", "history:create"]);
}

#[tokio::test]
async fn update_records_before_mutation() {
  for op in [Op::UPDATE, Op::UPDATE_ONE] {
    let m = Scripted::new(op);
    with_history(Executor::default()).mutate(&m).await.unwrap();
    assert_eq!(m.steps(), ["history:update", "mutate"]);
  }
}

#[tokio::test]
async fn delete_records_before_mutation() {
  for op in [Op::DELETE, Op::DELETE_ONE] {
    let m = Scripted::new(op);
    with_history(Executor::default()).mutate(&m).await.unwrap();
    assert_eq!(m.steps(), ["history:delete", "mutate"]);
  }
}

#[tokio::test]
async fn unrelated_ops_pass_through() {
  let m = Scripted::new(Op::empty());
  with_history(Executor::default()).mutate(&m).await.unwrap();
  assert_eq!(m.steps(), ["mutate"]);
}

#[tokio::test]
async fn failed_create_writes_no_history() {
  let m = Scripted::new(Op::CREATE);
  let err = with_history(Executor { fail: true })
    .mutate(&m)
    .await
    .unwrap_err();
  assert_eq!(err, TestError::Mutation);
  assert!(m.steps().is_empty());
}

#[tokio::test]
async fn failed_update_history_skips_mutation() {
  let m = Scripted::new(Op::UPDATE_ONE).failing_history();
  let err = with_history(Executor::default()).mutate(&m).await.unwrap_err();
  assert_eq!(err, TestError::History);
  assert!(m.steps().is_empty());
}

#[tokio::test]
async fn failed_delete_history_skips_mutation() {
  let m = Scripted::new(Op::DELETE).failing_history();
  let err = with_history(Executor::default()).mutate(&m).await.unwrap_err();
  assert_eq!(err, TestError::History);
  assert!(m.steps().is_empty());
}

#[tokio::test]
async fn failed_create_history_after_mutation_is_reported() {
  let m = Scripted::new(Op::CREATE).failing_history();
  let err = with_history(Executor::default()).mutate(&m).await.unwrap_err();
  assert_eq!(err, TestError::History);
  // The create itself already happened; nothing is rolled back.
  assert_eq!(m.steps(), ["mutate"]);
}

// ─── Type-erased chains ──────────────────────────────────────────────────────

struct Other(Op);

impl Mutation for Other {
  fn op(&self) -> Op { self.0 }
}

#[derive(Default)]
struct ErasedExecutor {
  calls: Mutex<u32>,
}

impl Mutator<dyn DynMutation> for ErasedExecutor {
  type Error = TestError;
  type Value = ();

  fn mutate<'a>(
    &'a self,
    _mutation: &'a dyn DynMutation,
  ) -> impl Future<Output = Result<(), TestError>> + Send + 'a {
    async move {
      *self.calls.lock().unwrap() += 1;
      Ok(())
    }
  }
}

#[tokio::test]
async fn erased_chain_runs_typed_hooks() {
  let chain = with_history_erased::<Scripted, _>(ErasedExecutor::default());
  let m = Scripted::new(Op::DELETE_ONE);
  chain.mutate(&m as &dyn DynMutation).await.unwrap();
  assert_eq!(m.steps(), ["history:delete"]);
  assert_eq!(*chain_calls(&chain), 1);
}

#[tokio::test]
async fn erased_chain_rejects_foreign_mutation() {
  let chain = with_history_erased::<Scripted, _>(ErasedExecutor::default());
  let err = chain
    .mutate(&Other(Op::UPDATE) as &dyn DynMutation)
    .await
    .unwrap_err();
  assert!(matches!(err, TestError::Hook(ref msg) if msg.contains("Scripted")));
  assert_eq!(*chain_calls(&chain), 0);
}

#[tokio::test]
async fn erased_chain_ignores_foreign_mutation_outside_targets() {
  let chain = with_history_erased::<Scripted, _>(ErasedExecutor::default());
  chain
    .mutate(&Other(Op::empty()) as &dyn DynMutation)
    .await
    .unwrap();
  assert_eq!(*chain_calls(&chain), 1);
}

type ErasedChain<T> =
  ErasedIntercept<T, ErasedIntercept<T, ErasedIntercept<T, ErasedExecutor>>>;

fn chain_calls<T>(chain: &ErasedChain<T>) -> std::sync::MutexGuard<'_, u32> {
  chain.inner().inner().inner().calls.lock().unwrap()
}

// ─── SQLite-backed entity ────────────────────────────────────────────────────

const SCHEMA: &str = "
CREATE TABLE invoice (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    amount INTEGER NOT NULL
);

CREATE TABLE invoice_history (
    history_time TEXT    NOT NULL,
    ref          INTEGER,
    operation    TEXT    NOT NULL,
    id           INTEGER NOT NULL,
    amount       INTEGER NOT NULL
);
";

#[derive(Debug, Error)]
enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
  #[error("invoice {0} not found")]
  NotFound(i64),
  #[error("invoice has no id yet")]
  MissingId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Invoice {
  id:     i64,
  amount: i64,
}

/// A pending invoice change. `id` is known up front for updates and deletes
/// and filled in by the store on create.
struct InvoiceMutation {
  op:     Op,
  conn:   tokio_rusqlite::Connection,
  id:     OnceLock<i64>,
  amount: i64,
}

impl InvoiceMutation {
  fn create(conn: &tokio_rusqlite::Connection, amount: i64) -> Self {
    Self { op: Op::CREATE, conn: conn.clone(), id: OnceLock::new(), amount }
  }

  fn update(conn: &tokio_rusqlite::Connection, id: i64, amount: i64) -> Self {
    Self {
      op: Op::UPDATE_ONE,
      conn: conn.clone(),
      id: OnceLock::from(id),
      amount,
    }
  }

  fn delete(conn: &tokio_rusqlite::Connection, id: i64) -> Self {
    Self {
      op: Op::DELETE_ONE,
      conn: conn.clone(),
      id: OnceLock::from(id),
      amount: 0,
    }
  }

  fn id(&self) -> Result<i64, StoreError> {
    self.id.get().copied().ok_or(StoreError::MissingId)
  }

  /// Snapshot the current row and append it to `invoice_history`.
  async fn snapshot(&self, operation: Operation) -> Result<(), StoreError> {
    let id = self.id()?;
    let row = load(&self.conn, id).await?.ok_or(StoreError::NotFound(id))?;
    let record = HistoryRecord::now(id, operation, row);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO invoice_history
             (history_time, ref, operation, id, amount)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            record.history_time.to_rfc3339(),
            record.reference,
            record.operation.as_str(),
            record.snapshot.id,
            record.snapshot.amount,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

async fn load(
  conn: &tokio_rusqlite::Connection,
  id: i64,
) -> Result<Option<Invoice>, StoreError> {
  let row = conn
    .call(move |conn| {
      Ok(
        conn
          .query_row(
            "SELECT id, amount FROM invoice WHERE id = ?1",
            rusqlite::params![id],
            |r| Ok(Invoice { id: r.get(0)?, amount: r.get(1)? }),
          )
          .optional()?,
      )
    })
    .await?;
  Ok(row)
}

impl Mutation for InvoiceMutation {
  fn op(&self) -> Op { self.op }
}

impl HistoryMutation for InvoiceMutation {
  type Error = StoreError;

  fn history_from_create(
    &self,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + '_ {
    self.snapshot(Operation::Create)
  }

  fn history_from_update(
    &self,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + '_ {
    self.snapshot(Operation::Update)
  }

  fn history_from_delete(
    &self,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + '_ {
    self.snapshot(Operation::Delete)
  }
}

/// Executes invoice mutations; knows nothing about history.
struct InvoiceStore;

impl Mutator<InvoiceMutation> for InvoiceStore {
  type Error = StoreError;
  type Value = i64;

  fn mutate<'a>(
    &'a self,
    m: &'a InvoiceMutation,
  ) -> impl Future<Output = Result<i64, StoreError>> + Send + 'a {
    async move {
      let amount = m.amount;
      if m.op.is(Op::CREATE) {
        let id = m
          .conn
          .call(move |conn| {
            conn.execute(
              "INSERT INTO invoice (amount) VALUES (?1)",
              rusqlite::params![amount],
            )?;
            Ok(conn.last_insert_rowid())
          })
          .await?;
        let _ = m.id.set(id);
        return Ok(id);
      }

      let id = m.id()?;
      let changed = if m.op.is(Op::UPDATE | Op::UPDATE_ONE) {
        m.conn
          .call(move |conn| {
            Ok(conn.execute(
              "UPDATE invoice SET amount = ?2 WHERE id = ?1",
              rusqlite::params![id, amount],
            )?)
          })
          .await?
      } else {
        m.conn
          .call(move |conn| {
            Ok(conn.execute(
              "DELETE FROM invoice WHERE id = ?1",
              rusqlite::params![id],
            )?)
          })
          .await?
      };
      if changed == 0 {
        return Err(StoreError::NotFound(id));
      }
      Ok(id)
    }
  }
}

async fn conn() -> tokio_rusqlite::Connection {
  let conn = tokio_rusqlite::Connection::open_in_memory()
    .await
    .expect("in-memory database");
  conn
    .call(|conn| {
      conn.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await
    .expect("schema");
  conn
}

async fn history(conn: &tokio_rusqlite::Connection) -> Vec<(i64, String, i64)> {
  conn
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT ref, operation, amount FROM invoice_history
         ORDER BY rowid",
      )?;
      let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;
      Ok(rows)
    })
    .await
    .expect("history rows")
}

#[tokio::test]
async fn sqlite_history_captures_post_and_pre_images() {
  let conn = conn().await;
  let store = with_history(InvoiceStore);

  let id = store
    .mutate(&InvoiceMutation::create(&conn, 100))
    .await
    .unwrap();
  store
    .mutate(&InvoiceMutation::update(&conn, id, 250))
    .await
    .unwrap();
  store.mutate(&InvoiceMutation::delete(&conn, id)).await.unwrap();

  assert_eq!(load(&conn, id).await.unwrap(), None);
  assert_eq!(
    history(&conn).await,
    [
      (id, "create".to_owned(), 100),
      (id, "update".to_owned(), 100),
      (id, "delete".to_owned(), 250),
    ]
  );
}

#[tokio::test]
async fn sqlite_update_of_missing_row_writes_nothing() {
  let conn = conn().await;
  let store = with_history(InvoiceStore);

  let err = store
    .mutate(&InvoiceMutation::update(&conn, 99, 1))
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::NotFound(99)));
  assert!(history(&conn).await.is_empty());
}
