//! Copies original fields into history-safe tracked fields.

use annal_core::{
  Error, Result,
  config::FieldProperties,
  field::{Field, FieldType, Position},
};

/// Index of the first tracked field. `history_time`, `ref` and `operation`
/// occupy 0..3.
pub const HISTORY_FIELD_OFFSET: usize = 3;

/// Clone `fields` for a history schema.
///
/// Every property is carried over except:
/// - `unique` is always cleared; a revision log repeats values by nature.
/// - positions are renumbered from [`HISTORY_FIELD_OFFSET`] in input order
///   and lose their mixin provenance, so the history schema treats every
///   field as its own.
///
/// `properties` force `nillable` / `immutable` on top of the original flags.
pub fn clone_fields(
  fields: &[Field],
  properties: FieldProperties,
) -> Result<Vec<Field>> {
  fields
    .iter()
    .enumerate()
    .map(|(i, field)| {
      check_type(field)?;
      Ok(Field {
        unique: false,
        nillable: field.nillable || properties.nillable,
        immutable: field.immutable || properties.immutable,
        position: Position::local(HISTORY_FIELD_OFFSET + i),
        ..field.clone()
      })
    })
    .collect()
}

fn check_type(field: &Field) -> Result<()> {
  match &field.field_type {
    FieldType::Other(ident) if ident.trim().is_empty() => {
      Err(Error::UnsupportedType {
        field:  field.name.clone(),
        reason: "custom type without an identifier".into(),
      })
    }
    FieldType::Enum(values) if values.is_empty() => {
      Err(Error::UnsupportedType {
        field:  field.name.clone(),
        reason: "enum without values".into(),
      })
    }
    _ => Ok(()),
  }
}
