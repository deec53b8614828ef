//! Walks a record's feature tree, one row insert per feature.
//!
//! The walk is depth-first in declaration order and driven by an explicit work
//! stack, so nesting depth is bounded by the input rather than the call stack.

use fieldsync_core::{Feature, Form, Record};

use crate::{
  columns::{column_values_for_feature, fold_columns},
  naming,
  options::SyncOptions,
  statement::{Insert, Statement},
  system::system_column_values_for_feature,
  value::{Row, Value},
};

/// The row insert for one feature. `parent` is `None` only for the root.
pub fn insert_row_for_feature_statement(
  form: &Form,
  feature: &Feature,
  parent: Option<&Feature>,
  record: &Record,
  options: &SyncOptions,
) -> Statement {
  let mut values = fold_columns(column_values_for_feature(feature));
  let system = system_column_values_for_feature(feature, parent, record, options);

  for (column, value) in system {
    if values.contains_key(&column) {
      tracing::warn!(
        record = %record.resource_id,
        column = %column,
        "form value column collides with a system column; keeping the system value"
      );
    }
    values.insert(column, value);
  }

  let table = naming::table_name(
    &options.table_prefix,
    form,
    feature.item().map(|item| item.element_key.as_str()),
  );

  tracing::trace!(table = %table, columns = values.len(), "feature row");

  Statement::Insert(Insert {
    table,
    values,
    primary_key: options.primary_key.clone(),
  })
}

/// Every nested item directly or transitively below `feature`, paired with
/// its parent, in emission order.
pub fn descendants(feature: &Feature) -> Vec<(&Feature, &Feature)> {
  let mut out = Vec::new();
  let mut stack = Vec::new();
  push_children(&mut stack, feature);

  while let Some((item, parent)) = stack.pop() {
    out.push((item, parent));
    push_children(&mut stack, item);
  }

  out
}

/// Push `feature`'s items so that popping yields them in declaration order.
fn push_children<'a>(stack: &mut Vec<(&'a Feature, &'a Feature)>, feature: &'a Feature) {
  let children = feature
    .form_values
    .iter()
    .filter_map(|fv| fv.items())
    .flatten();
  let start = stack.len();
  stack.extend(children.map(|item| (item, feature)));
  stack[start..].reverse();
}

/// Inserts for every item below `feature`: each item's row, then its own
/// descendants, before moving to the next sibling.
pub fn insert_child_features_for_feature_statements(
  form: &Form,
  feature: &Feature,
  record: &Record,
  options: &SyncOptions,
) -> Vec<Statement> {
  descendants(feature)
    .into_iter()
    .map(|(item, parent)| {
      insert_row_for_feature_statement(form, item, Some(parent), record, options)
    })
    .collect()
}

// ─── Multiple values ─────────────────────────────────────────────────────────

/// One `_values` row per multi-value entry of `feature`'s non-empty values.
pub fn insert_multiple_values_for_feature_statements(
  form: &Form,
  feature: &Feature,
  record: &Record,
  options: &SyncOptions,
) -> Vec<Statement> {
  let table = naming::multiple_value_table_name(&options.table_prefix, form);
  let parent_resource_id: Value = feature.item().map(|item| item.resource_id).into();

  feature
    .form_values
    .iter()
    .filter(|fv| !fv.is_empty())
    .flat_map(|fv| {
      fv.multiple_values()
        .into_iter()
        .map(move |text| (fv.element_key.clone(), text))
    })
    .map(|(key, text)| {
      let mut values = Row::new();
      values.insert("key".into(), key.into());
      values.insert("text_value".into(), text.into());
      values.insert("record_id".into(), record.row_id.into());
      values.insert("record_resource_id".into(), record.resource_id.into());
      values.insert("parent_resource_id".into(), parent_resource_id.clone());

      Statement::Insert(Insert {
        table: table.clone(),
        values,
        primary_key: options.primary_key.clone(),
      })
    })
    .collect()
}

/// Multi-value rows for every item below `feature`, in traversal order.
pub fn insert_child_multiple_values_for_feature_statements(
  form: &Form,
  feature: &Feature,
  record: &Record,
  options: &SyncOptions,
) -> Vec<Statement> {
  descendants(feature)
    .into_iter()
    .flat_map(|(item, _)| {
      insert_multiple_values_for_feature_statements(form, item, record, options)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use fieldsync_core::{FeatureKind, FormContent, FormValue, Linkage, RepeatableItem};
  use uuid::Uuid;

  use super::*;

  fn item(key: &str, index: usize, children: Vec<FormValue>) -> Feature {
    let mut f = Feature::new(FeatureKind::Item(RepeatableItem {
      resource_id: Uuid::new_v4(),
      element_key: key.into(),
      index,
      created_by: Linkage::default(),
      updated_by: Linkage::default(),
      changeset: Linkage::default(),
    }));
    f.display_value = Some(format!("{key}-{index}"));
    f.form_values = children;
    f
  }

  fn titles(pairs: &[(&Feature, &Feature)]) -> Vec<String> {
    pairs
      .iter()
      .map(|(f, _)| f.display_value.clone().unwrap_or_default())
      .collect()
  }

  #[test]
  fn depth_first_in_declaration_order() {
    let mut root = Feature::new(FeatureKind::Root);
    root.form_values = vec![
      FormValue::new(
        "rooms",
        FormContent::Items(vec![
          item("rooms", 0, vec![FormValue::new(
            "fixtures",
            FormContent::Items(vec![item("fixtures", 0, vec![]), item("fixtures", 1, vec![])]),
          )]),
          item("rooms", 1, vec![]),
        ]),
      ),
      FormValue::new("visits", FormContent::Items(vec![item("visits", 0, vec![])])),
    ];

    let walked = descendants(&root);
    assert_eq!(
      titles(&walked),
      ["rooms-0", "fixtures-0", "fixtures-1", "rooms-1", "visits-0"]
    );

    // fixtures hang off the first room, rooms and visits off the root
    assert_eq!(walked[1].1.display_value.as_deref(), Some("rooms-0"));
    assert!(walked[3].1.is_root());
    assert!(walked[4].1.is_root());
  }

  #[test]
  fn deep_nesting_does_not_recurse() {
    let mut leaf = item("level", 0, vec![]);
    for _ in 0..20_000 {
      leaf = item("level", 0, vec![FormValue::new("level", FormContent::Items(vec![leaf]))]);
    }
    let mut root = Feature::new(FeatureKind::Root);
    root.form_values = vec![FormValue::new("level", FormContent::Items(vec![leaf]))];

    assert_eq!(descendants(&root).len(), 20_001);
    drop(root);
  }
}
