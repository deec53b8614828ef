//! User-entered columns of a feature's row.

use chrono::Datelike;
use fieldsync_core::{Feature, FormContent, FormValue};
use indexmap::IndexMap;

use crate::value::{Literal, Row, Value};

/// Prefix that marks a column as user-entered rather than system-maintained.
pub const FIELD_COLUMN_PREFIX: char = 'f';

/// Dates past this year occur in the wild but do not fit the target column.
const MAX_DATE_YEAR: i32 = 9999;

/// What one form value adds to its feature's row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnContribution {
  /// A single `f<key>` column.
  Scalar(String, Value),
  /// Several independently named columns, merged into the row as-is. Their
  /// names must not collide with system column names.
  Composite(IndexMap<String, Value>),
}

pub fn field_column_name(element_key: &str) -> String {
  format!("{FIELD_COLUMN_PREFIX}{}", element_key.to_lowercase())
}

/// The contribution of a single form value, if any. Empty values and
/// repeatable item lists contribute nothing.
pub fn column_contribution(form_value: &FormValue) -> Option<ColumnContribution> {
  let scalar = |v: Value| {
    Some(ColumnContribution::Scalar(
      field_column_name(&form_value.element_key),
      v,
    ))
  };

  match &form_value.content {
    FormContent::Empty | FormContent::Items(_) => None,
    FormContent::Text(s) => scalar(s.clone().into()),
    FormContent::Number(n) => scalar((*n).into()),
    FormContent::Choices(c) => scalar(Literal::TextArray(c.clone()).into()),
    FormContent::Date(d) if d.year() > MAX_DATE_YEAR => scalar(Value::NULL),
    FormContent::Date(d) => scalar((*d).into()),
    FormContent::Composite(map) => Some(ColumnContribution::Composite(
      map
        .iter()
        .map(|(k, v)| (k.clone(), Literal::from_json(v).into()))
        .collect(),
    )),
  }
}

/// Contributions of every form value on `feature`, in order.
pub fn column_values_for_feature(feature: &Feature) -> Vec<ColumnContribution> {
  feature
    .form_values
    .iter()
    .filter_map(column_contribution)
    .collect()
}

/// Fold contributions into a row; later columns replace earlier ones.
pub fn fold_columns(contributions: Vec<ColumnContribution>) -> Row {
  let mut row = Row::new();
  for contribution in contributions {
    match contribution {
      ColumnContribution::Scalar(name, value) => {
        row.insert(name, value);
      }
      ColumnContribution::Composite(columns) => row.extend(columns),
    }
  }
  row
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use fieldsync_core::FeatureKind;
  use serde_json::json;

  use super::*;

  fn feature(values: Vec<FormValue>) -> Feature {
    let mut f = Feature::new(FeatureKind::Root);
    f.form_values = values;
    f
  }

  #[test]
  fn key_is_lowercased_and_prefixed() {
    let row = fold_columns(column_values_for_feature(&feature(vec![
      FormValue::new("A1B2", FormContent::Text("oak".into())),
    ])));
    assert_eq!(row.get("fa1b2"), Some(&Value::from("oak")));
  }

  #[test]
  fn empty_values_leave_no_key() {
    let row = fold_columns(column_values_for_feature(&feature(vec![
      FormValue::new("name", FormContent::Empty),
      FormValue::new("rooms", FormContent::Items(vec![])),
    ])));
    assert!(row.is_empty(), "got: {row:?}");
  }

  #[test]
  fn far_future_date_becomes_null() {
    let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
    let near = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
    let row = fold_columns(column_values_for_feature(&feature(vec![
      FormValue::new("far", FormContent::Date(far)),
      FormValue::new("near", FormContent::Date(near)),
    ])));

    assert!(row.contains_key("ffar"));
    assert!(row["ffar"].is_null());
    assert_eq!(row["fnear"], Value::from(near));
  }

  #[test]
  fn composite_expands_into_several_columns() {
    let parts = [
      ("faddr_locality".to_string(), json!("Portland")),
      ("faddr_postal_code".to_string(), json!("97201")),
    ];
    let row = fold_columns(column_values_for_feature(&feature(vec![
      FormValue::new("addr", FormContent::Composite(parts.into_iter().collect())),
    ])));

    assert_eq!(row.len(), 2);
    assert_eq!(row["faddr_locality"], Value::from("Portland"));
    assert!(!row.contains_key("faddr"));
  }

  #[test]
  fn choices_are_arrays() {
    let row = fold_columns(column_values_for_feature(&feature(vec![
      FormValue::new("tags", FormContent::Choices(vec!["a".into(), "b".into()])),
    ])));
    assert_eq!(
      row["ftags"],
      Value::Literal(Literal::TextArray(vec!["a".into(), "b".into()]))
    );
  }
}
