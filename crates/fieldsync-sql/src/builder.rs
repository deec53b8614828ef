//! Full statement sequences for records and forms.
//!
//! Updates are never incremental: every call deletes all rows a record could
//! own across the form's tables, then inserts them afresh.

use fieldsync_core::{Form, Record};

use crate::{
  naming,
  options::SyncOptions,
  statement::{Delete, Statement},
  traversal::{
    insert_child_features_for_feature_statements,
    insert_child_multiple_values_for_feature_statements,
    insert_multiple_values_for_feature_statements, insert_row_for_feature_statement,
  },
  value::Row,
};

/// Deletes for every table of `form` followed by inserts for `record`.
pub fn update_for_record_statements(
  form: &Form,
  record: &Record,
  options: &SyncOptions,
) -> Vec<Statement> {
  let mut statements = delete_for_record_statements(form, record, options);
  let deletes = statements.len();

  statements.extend(insert_for_record_statements(form, record, options));

  tracing::debug!(
    record = %record.resource_id,
    deletes,
    inserts = statements.len() - deletes,
    "record statements"
  );

  statements
}

/// One insert for the root feature, then one per nested item. With
/// `multiple_values` on, the `_values` rows follow.
pub fn insert_for_record_statements(
  form: &Form,
  record: &Record,
  options: &SyncOptions,
) -> Vec<Statement> {
  let root = &record.root;

  let mut statements = vec![insert_row_for_feature_statement(
    form, root, None, record, options,
  )];
  statements.extend(insert_child_features_for_feature_statements(
    form, root, record, options,
  ));

  if options.multiple_values {
    statements.extend(insert_multiple_values_for_feature_statements(
      form, root, record, options,
    ));
    statements.extend(insert_child_multiple_values_for_feature_statements(
      form, root, record, options,
    ));
  }

  statements
}

/// Deletes every row owned by `record` from each of the form's tables,
/// including repeatables that currently have no items.
pub fn delete_for_record_statements(
  form: &Form,
  record: &Record,
  options: &SyncOptions,
) -> Vec<Statement> {
  naming::form_table_names(&options.table_prefix, form)
    .into_iter()
    .map(|table| {
      let mut filter = Row::new();
      filter.insert("record_resource_id".into(), record.resource_id.into());
      Statement::Delete(Delete { table, filter })
    })
    .collect()
}

/// Deletes every row from each of the form's tables.
pub fn delete_for_form_statements(form: &Form, options: &SyncOptions) -> Vec<Statement> {
  naming::form_table_names(&options.table_prefix, form)
    .into_iter()
    .map(|table| {
      Statement::Delete(Delete {
        table,
        filter: Row::new(),
      })
    })
    .collect()
}
