//! Record → SQL statement transformation for fieldsync.
//!
//! Turns a [`Record`](fieldsync_core::Record) collected against a
//! [`Form`](fieldsync_core::Form) into an ordered list of [`Statement`]s that
//! replace every row the record owns in a flat PostGIS schema: one table per
//! form, one per repeatable element, and an auxiliary multiple-values table.
//! Pure and synchronous; no database or network dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use fieldsync_core::{Form, Record};
//! use fieldsync_sql::{SyncOptions, render, update_for_record_statements};
//!
//! # fn run(form_json: &str, record_json: &str) -> fieldsync_core::Result<()> {
//! let form = Form::from_json(form_json)?;
//! let record = Record::from_json(record_json)?;
//!
//! for statement in update_for_record_statements(&form, &record, &SyncOptions::default()) {
//!   println!("{}", render::to_sql(&statement));
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod columns;
pub mod geometry;
pub mod naming;
pub mod options;
pub mod render;
pub mod statement;
pub mod system;
pub mod traversal;
pub mod value;

pub use builder::{
  delete_for_form_statements, delete_for_record_statements,
  insert_for_record_statements, update_for_record_statements,
};
pub use options::SyncOptions;
pub use statement::{Delete, Insert, Statement};
pub use value::{Literal, Row, Value};
