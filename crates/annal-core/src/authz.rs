//! The authorization descriptor attached to every derived history schema.

use serde::{Deserialize, Serialize};

/// Id field name used on history schemas in place of the original `ID`; the
/// original primary key lives in the synthetic `ref` field.
pub const REF_ID_FIELD: &str = "Ref";

/// Which access-control object type and relation govern visibility of a
/// history table's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzPolicyDescriptor {
  pub enabled:           bool,
  pub object_type:       String,
  pub id_field:          String,
  pub allowed_relation:  String,
  pub nillable_id_field: bool,
  /// Derived from the mixed-in `owner_id` field, never declared.
  pub org_owned:         bool,
  /// Derived from the mixed-in `owner_id` field, never declared.
  pub user_owned:        bool,
}

impl AuthzPolicyDescriptor {
  pub fn disabled() -> Self { Self::default() }
}

/// Map an id field from the original schema onto the history schema.
///
/// `"ID"` and `""` both refer to the original primary key, which the history
/// schema only exposes as `Ref`.
pub fn history_id_field(id_field: &str) -> String {
  if id_field.is_empty() || id_field == "ID" {
    REF_ID_FIELD.to_owned()
  } else {
    id_field.to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn id_and_empty_map_to_ref() {
    assert_eq!(history_id_field("ID"), "Ref");
    assert_eq!(history_id_field(""), "Ref");
  }

  #[test]
  fn other_id_fields_pass_through() {
    assert_eq!(history_id_field("OwnerID"), "OwnerID");
    assert_eq!(history_id_field("id"), "id");
  }
}
