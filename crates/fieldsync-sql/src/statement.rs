//! Statement descriptors handed to the execution layer.
//!
//! A statement list is ordered: every delete for a record precedes its
//! inserts, and a parent feature's insert precedes its children's. Lists may
//! be concatenated but never reordered or deduplicated.

use crate::value::Row;

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
  pub table:       String,
  pub values:      Row,
  /// Primary-key column of the destination table; metadata only, never
  /// present in `values`.
  pub primary_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
  pub table:  String,
  /// Column equality filter; empty deletes every row.
  pub filter: Row,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
  Insert(Insert),
  Delete(Delete),
}

impl Statement {
  pub fn table(&self) -> &str {
    match self {
      Self::Insert(i) => &i.table,
      Self::Delete(d) => &d.table,
    }
  }

  pub fn is_insert(&self) -> bool { matches!(self, Self::Insert(_)) }

  pub fn is_delete(&self) -> bool { matches!(self, Self::Delete(_)) }

  pub fn as_insert(&self) -> Option<&Insert> {
    match self {
      Self::Insert(i) => Some(i),
      Self::Delete(_) => None,
    }
  }
}
