//! A ready-made shape for history rows.

use annal_core::operation::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One revision of an entity: when it was recorded, which row it belongs to,
/// what happened, and the row's field values at that point.
///
/// `R` is the entity's id type and `T` its snapshot type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord<R, T> {
  /// Server-assigned; never changes after the row is written.
  pub history_time: DateTime<Utc>,
  #[serde(rename = "ref")]
  pub reference:    R,
  pub operation:    Operation,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_by:   Option<String>,
  pub snapshot:     T,
}

impl<R, T> HistoryRecord<R, T> {
  /// A record stamped with the current time.
  pub fn now(reference: R, operation: Operation, snapshot: T) -> Self {
    Self {
      history_time: Utc::now(),
      reference,
      operation,
      updated_by: None,
      snapshot,
    }
  }

  pub fn with_updated_by(mut self, actor: impl Into<String>) -> Self {
    self.updated_by = Some(actor.into());
    self
  }
}
