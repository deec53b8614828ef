//! Core value types for fieldsync: forms, records, features, and the values
//! entered on them.
//!
//! This crate is deliberately free of SQL and I/O concerns. The statement
//! builder (`fieldsync-sql`) and the binary (`fieldsync-cli`) depend on it; it
//! depends on nothing proprietary.

pub mod error;
pub mod feature;
pub mod form;
pub mod record;

pub use error::{Error, Result};
pub use feature::{
  Coordinate, Feature, FeatureKind, FormContent, FormValue, Linkage,
  LocationSnapshot, RepeatableItem,
};
pub use form::{Element, ElementType, Form};
pub use record::Record;
