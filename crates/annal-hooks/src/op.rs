//! Operation bitmask for in-flight mutations.

use std::{fmt, ops::BitOr};

use annal_core::operation::Operation;

/// A set of mutation kinds. A mutation reports exactly one; hooks target
/// several.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Op(u8);

impl Op {
  pub const CREATE: Self = Self(1);
  pub const UPDATE: Self = Self(1 << 1);
  pub const UPDATE_ONE: Self = Self(1 << 2);
  pub const DELETE: Self = Self(1 << 3);
  pub const DELETE_ONE: Self = Self(1 << 4);

  const NAMES: [(Self, &'static str); 5] = [
    (Self::CREATE, "create"),
    (Self::UPDATE, "update"),
    (Self::UPDATE_ONE, "update_one"),
    (Self::DELETE, "delete"),
    (Self::DELETE_ONE, "delete_one"),
  ];

  pub const fn empty() -> Self { Self(0) }

  pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }

  /// True if the two sets share at least one operation.
  pub const fn is(self, other: Self) -> bool { self.0 & other.0 != 0 }

  pub const fn is_empty(self) -> bool { self.0 == 0 }

  /// The history operation recorded for this mutation kind.
  pub fn history_operation(self) -> Option<Operation> {
    if self.is(Self::CREATE) {
      Some(Operation::Create)
    } else if self.is(Self::UPDATE.union(Self::UPDATE_ONE)) {
      Some(Operation::Update)
    } else if self.is(Self::DELETE.union(Self::DELETE_ONE)) {
      Some(Operation::Delete)
    } else {
      None
    }
  }
}

impl BitOr for Op {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_empty() {
      return f.write_str("none");
    }
    let mut first = true;
    for (op, name) in Self::NAMES {
      if self.is(op) {
        if !first {
          f.write_str("|")?;
        }
        f.write_str(name)?;
        first = false;
      }
    }
    Ok(())
  }
}

impl fmt::Debug for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Op({self})")
  }
}
