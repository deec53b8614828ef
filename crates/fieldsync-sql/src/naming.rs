//! Table names derived from a form's identity.
//!
//! Names depend only on the prefix, the account and form row ids, and an
//! optional repeatable key; they are stable across calls.

use fieldsync_core::Form;

/// Root table of `form`, or the table of its repeatable `repeatable_key`.
pub fn table_name(
  prefix: &str,
  form: &Form,
  repeatable_key: Option<&str>,
) -> String {
  let root = format!("{prefix}{}_form_{}", form.account_row_id, form.row_id);
  match repeatable_key {
    Some(key) => format!("{root}_{key}"),
    None => root,
  }
}

/// Auxiliary table holding one row per multi-value entry.
pub fn multiple_value_table_name(prefix: &str, form: &Form) -> String {
  format!("{}_values", table_name(prefix, form, None))
}

/// Every table that can hold rows for `form`: root, each repeatable in
/// declaration order, then the auxiliary values table.
pub fn form_table_names(prefix: &str, form: &Form) -> Vec<String> {
  let mut names = vec![table_name(prefix, form, None)];
  names.extend(
    form
      .repeatables()
      .into_iter()
      .map(|r| table_name(prefix, form, Some(&r.key))),
  );
  names.push(multiple_value_table_name(prefix, form));
  names
}
