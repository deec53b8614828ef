//! Error types for `fieldsync-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("form element has an empty key")]
  EmptyElementKey,

  #[error("repeatable key {0:?} is declared more than once")]
  DuplicateRepeatableKey(String),

  #[error("no repeatable element with key {0:?} on this form")]
  UnknownRepeatable(String),

  /// An entry in a repeatable's item list is not an item of that repeatable.
  #[error("item {index} under {key:?} is not an item of that repeatable")]
  MisplacedItem { key: String, index: usize },

  #[error("the root feature of a record cannot be a repeatable item")]
  RootFeatureIsItem,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
